use std::collections::BTreeMap;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use crate::core::{Column, IDENTITY_COLUMN};
use crate::model::{EntityClass, responds_to};
use crate::query::Join;
use super::options::ForeignKeyPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// A column of the composed table, forwarded under its own name.
    Column,
    /// A non-column member listed in `with`.
    Extra,
    /// `<association>_<field>` alias of a composed field.
    Prefixed,
}

/// One name the host answers to on behalf of a composed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedField {
    /// Name on the host.
    pub name: String,
    /// Name on the composed record.
    pub target: String,
    pub kind: FieldKind,
}

impl ExposedField {
    pub fn new(name: impl Into<String>, target: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            kind,
        }
    }
}

/// A declared composition. Built once when the host class is defined and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AssociationDescriptor {
    name: String,
    composed: Arc<EntityClass>,
    composed_columns: Vec<Column>,
    foreign_key: ForeignKeyPolicy,
    fields: Vec<ExposedField>,
    wired: bool,
    passthrough: BTreeMap<String, serde_json::Value>,
}

impl AssociationDescriptor {
    pub(crate) fn new(
        name: impl Into<String>,
        composed: Arc<EntityClass>,
        composed_columns: Vec<Column>,
        foreign_key: ForeignKeyPolicy,
        fields: Vec<ExposedField>,
        passthrough: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            name: name.into(),
            composed,
            composed_columns,
            foreign_key,
            fields,
            wired: true,
            passthrough,
        }
    }

    /// Descriptor for a composed class whose table does not exist yet: the
    /// relationship is declared but no field is forwarded.
    pub(crate) fn unwired(
        name: impl Into<String>,
        composed: Arc<EntityClass>,
        foreign_key: ForeignKeyPolicy,
        passthrough: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            wired: false,
            ..Self::new(name, composed, Vec::new(), foreign_key, Vec::new(), passthrough)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn composed_class(&self) -> &Arc<EntityClass> {
        &self.composed
    }

    pub fn composed_table(&self) -> &str {
        self.composed.table_name()
    }

    pub fn composed_columns(&self) -> &[Column] {
        &self.composed_columns
    }

    pub fn foreign_key(&self) -> &ForeignKeyPolicy {
        &self.foreign_key
    }

    /// Whether fields were forwarded; `false` when the composed table was
    /// missing at declaration time.
    pub fn is_wired(&self) -> bool {
        self.wired
    }

    pub fn fields(&self) -> &[ExposedField] {
        &self.fields
    }

    pub fn exposed_fields(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn field(&self, name: &str) -> Option<&ExposedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Composed column a host-facing field filters on, if it is a column.
    pub fn column_for(&self, name: &str) -> Option<&str> {
        let field = self.field(name)?;
        self.has_composed_column(&field.target).then_some(field.target.as_str())
    }

    /// Options handed to the underlying one-to-one relationship; autosave is
    /// always on.
    pub fn relationship_options(&self) -> BTreeMap<String, serde_json::Value> {
        let mut options = self.passthrough.clone();
        options.insert("autosave".to_string(), serde_json::Value::Bool(true));
        options
    }

    /// Join from the host table to the composed table.
    pub fn join(&self) -> Join {
        Join {
            association: self.name.clone(),
            table: self.composed_table().to_string(),
            left_column: self.foreign_key.host_column().to_string(),
            right_column: IDENTITY_COLUMN.to_string(),
        }
    }

    /// Whether a composed record of this association would answer `member`.
    pub fn composed_responds_to(&self, member: &str) -> bool {
        responds_to(&self.composed, |name| self.has_composed_column(name), member)
    }

    /// Same association, class, key policy and forwarded fields.
    pub fn same_declaration(&self, other: &AssociationDescriptor) -> bool {
        self.name == other.name
            && self.composed.name() == other.composed.name()
            && self.foreign_key == other.foreign_key
            && self.fields == other.fields
            && self.wired == other.wired
    }

    fn has_composed_column(&self, name: &str) -> bool {
        self.composed_columns.iter().any(|col| col.name == name)
    }
}
