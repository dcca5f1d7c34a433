//! Composition of a host entity over one-to-one composed entities.
//!
//! A host class declares compositions once through [`HostModel::define`];
//! the resulting [`HostModel`] is immutable and shared by every
//! [`HostRecord`] built from it. Reads, writes, queries, change tracking and
//! serialization on a host record transparently reach the composed records.

mod accessor;
mod descriptor;
mod host;
mod instance;
mod options;
mod registry;
mod rewriter;
mod whitelist;

pub use accessor::{Accessor, AccessorTable};
pub use descriptor::{AssociationDescriptor, ExposedField, FieldKind};
pub use host::{HostModel, HostModelBuilder};
pub use instance::HostRecord;
pub use options::{ActsAsOptions, ForeignKeyPolicy};
pub use registry::AssociationRegistry;
pub use rewriter::Filter;
pub use whitelist::{EXCLUDED_COLUMNS, exposed_fields};
