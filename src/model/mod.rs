//! Entity classes, class resolution, persisted records and their base
//! JSON serialization.

mod class;
mod record;
mod resolver;
pub mod serialize;

pub use class::{EntityClass, Getter, Method, Setter};
pub use record::Record;
pub(crate) use record::responds_to;
pub use resolver::{ClassRegistry, class_name_for, default_table_name};
pub use serialize::{JsonSource, SerializeOptions, as_json};
