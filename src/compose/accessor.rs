use std::fmt;
use std::sync::Arc;
use indexmap::IndexMap;
use crate::core::{DbError, Result, Value};
use crate::model::Record;
use super::descriptor::AssociationDescriptor;

type Reader = Arc<dyn Fn(&mut Record) -> Result<Value> + Send + Sync>;
type Writer = Arc<dyn Fn(&mut Record, Value) -> Result<()> + Send + Sync>;

/// Getter/setter pair forwarding one host field to a composed record.
#[derive(Clone)]
pub struct Accessor {
    association: String,
    field: String,
    target: String,
    reader: Reader,
    writer: Writer,
}

impl Accessor {
    fn forwarding(association: &str, field: &str, target: &str) -> Self {
        let read_target = target.to_string();
        let write_target = target.to_string();
        Self {
            association: association.to_string(),
            field: field.to_string(),
            target: target.to_string(),
            reader: Arc::new(move |record: &mut Record| record.call(&read_target, &[])),
            writer: Arc::new(move |record: &mut Record, value: Value| record.set(&write_target, value)),
        }
    }

    pub fn association(&self) -> &str {
        &self.association
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn read(&self, composed: &mut Record) -> Result<Value> {
        (self.reader)(composed)
    }

    /// Calls the target member with arguments, for delegated methods.
    pub fn invoke(&self, composed: &mut Record, args: &[Value]) -> Result<Value> {
        if args.is_empty() {
            return self.read(composed);
        }
        composed.call(&self.target, args)
    }

    pub fn write(&self, composed: &mut Record, value: Value) -> Result<()> {
        (self.writer)(composed, value)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessor")
            .field("association", &self.association)
            .field("field", &self.field)
            .field("target", &self.target)
            .finish()
    }
}

/// Host field name -> forwarding accessor, built when the host class is
/// defined.
#[derive(Debug, Clone, Default)]
pub struct AccessorTable {
    accessors: IndexMap<String, Accessor>,
}

impl AccessorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs one accessor per exposed field of `descriptor`. Installing the
    /// same association again changes nothing; a field already forwarded to
    /// a different association or target is rejected before anything is
    /// installed. Returns the number of new accessors.
    pub fn install(&mut self, descriptor: &AssociationDescriptor) -> Result<usize> {
        for field in descriptor.fields() {
            if let Some(existing) = self.accessors.get(&field.name)
                && (existing.association != descriptor.name() || existing.target != field.target)
            {
                return Err(DbError::AmbiguousField {
                    field: field.name.clone(),
                    first: existing.association.clone(),
                    second: descriptor.name().to_string(),
                });
            }
        }

        let mut installed = 0;
        for field in descriptor.fields() {
            if !self.accessors.contains_key(&field.name) {
                self.accessors.insert(
                    field.name.clone(),
                    Accessor::forwarding(descriptor.name(), &field.name, &field.target),
                );
                installed += 1;
            }
        }
        Ok(installed)
    }

    pub fn get(&self, field: &str) -> Option<&Accessor> {
        self.accessors.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.accessors.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::compose::descriptor::{ExposedField, FieldKind};
    use crate::compose::options::ForeignKeyPolicy;
    use crate::core::{Column, DataType};
    use crate::model::EntityClass;

    fn paint_descriptor(name: &str) -> AssociationDescriptor {
        AssociationDescriptor::new(
            name,
            Arc::new(EntityClass::new("Paint")),
            vec![Column::new("color", DataType::Text), Column::new("name", DataType::Text)],
            ForeignKeyPolicy::SharedPrimaryKey,
            vec![
                ExposedField::new("color", "color", FieldKind::Column),
                ExposedField::new(format!("{}_name", name), "name", FieldKind::Prefixed),
            ],
            BTreeMap::new(),
        )
    }

    #[test]
    fn test_install_is_idempotent() {
        let mut table = AccessorTable::new();
        let descriptor = paint_descriptor("paint");

        assert_eq!(table.install(&descriptor).unwrap(), 2);
        assert_eq!(table.install(&descriptor).unwrap(), 0);
        assert_eq!(table.fields().collect::<Vec<_>>(), vec!["color", "paint_name"]);
    }

    #[test]
    fn test_conflicting_install_changes_nothing() {
        let mut table = AccessorTable::new();
        table.install(&paint_descriptor("paint")).unwrap();

        let err = table.install(&paint_descriptor("coat")).unwrap_err();
        assert!(matches!(err, DbError::AmbiguousField { ref field, .. } if field == "color"));
        assert!(!table.contains("coat_name"));
    }

    #[test]
    fn test_prefixed_accessor_targets_subfield() {
        let class = Arc::new(EntityClass::new("Paint"));
        let columns = vec![Column::new("name", DataType::Text)];
        let mut paint = Record::build(class, &columns);

        let mut table = AccessorTable::new();
        table.install(&paint_descriptor("paint")).unwrap();
        let accessor = table.get("paint_name").unwrap();

        accessor.write(&mut paint, Value::from("Midnight")).unwrap();
        assert_eq!(paint.get("name").unwrap(), Value::from("Midnight"));
        assert_eq!(accessor.read(&mut paint).unwrap(), Value::from("Midnight"));
    }
}
