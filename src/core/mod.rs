pub mod changes;
pub mod error;
pub mod types;
pub mod value;

pub use changes::{ChangeSet, FieldChange};
pub use error::{DbError, Result};
pub use types::{
    Attributes, CREATED_AT_COLUMN, Column, IDENTITY_COLUMN, Row, Schema, UPDATED_AT_COLUMN,
};
pub use value::{DataType, Value};
