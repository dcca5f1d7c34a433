use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::core::IDENTITY_COLUMN;

/// How a host record is linked to its composed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeignKeyPolicy {
    /// The composed record's identity equals the host's identity.
    SharedPrimaryKey,
    /// The host holds the composed record's identity in `column`.
    Standard { column: String },
}

impl ForeignKeyPolicy {
    /// `Some("id")` selects the shared key; any other column is a standard
    /// reference; `None` defaults to `<association>_id`.
    pub fn resolve(association: &str, foreign_key: Option<&str>) -> Self {
        match foreign_key {
            Some(IDENTITY_COLUMN) => Self::SharedPrimaryKey,
            Some(column) => Self::Standard { column: column.to_string() },
            None => Self::Standard { column: format!("{}_{}", association, IDENTITY_COLUMN) },
        }
    }

    /// Host column holding the composed record's identity.
    pub fn host_column(&self) -> &str {
        match self {
            Self::SharedPrimaryKey => IDENTITY_COLUMN,
            Self::Standard { column } => column,
        }
    }

    pub fn is_shared(&self) -> bool {
        matches!(self, Self::SharedPrimaryKey)
    }
}

/// Options accepted when a host declares a composition.
///
/// ```
/// use composedb::ActsAsOptions;
///
/// let options = ActsAsOptions::new()
///     .with(["shade"])
///     .prefix(["name"])
///     .foreign_key("id");
/// assert_eq!(options.prefix, vec!["name".to_string()]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActsAsOptions {
    /// Extra members to delegate that are not plain columns.
    pub with: Vec<String>,
    /// Composed fields exposed as `<association>_<field>` instead.
    pub prefix: Vec<String>,
    /// Composed class when it differs from the association name.
    pub class_name: Option<String>,
    /// `"id"` for a shared primary key, otherwise the host's reference column.
    pub foreign_key: Option<String>,
    /// Anything else, handed unchanged to the relationship declaration.
    #[serde(flatten)]
    pub passthrough: BTreeMap<String, serde_json::Value>,
}

impl ActsAsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn prefix<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix.extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }

    pub fn foreign_key(mut self, column: impl Into<String>) -> Self {
        self.foreign_key = Some(column.into());
        self
    }

    pub fn shared_primary_key(self) -> Self {
        self.foreign_key(IDENTITY_COLUMN)
    }

    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.passthrough.insert(key.into(), value.into());
        self
    }
}
