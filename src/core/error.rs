use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DbError {
    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Record {id} not found in table '{table}'")]
    RecordNotFound { table: String, id: i64 },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Field '{field}' is claimed by both '{first}' and '{second}'")]
    AmbiguousField {
        field: String,
        first: String,
        second: String,
    },

    #[error("Cannot materialize '{association}': {reason}")]
    MaterializationFailed { association: String, reason: String },

    #[error("Undefined member '{member}' for {entity}")]
    UnknownMember { entity: String, member: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub(crate) fn unknown_member(entity: impl Into<String>, member: impl Into<String>) -> Self {
        Self::UnknownMember {
            entity: entity.into(),
            member: member.into(),
        }
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
