use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;
use crate::core::{Attributes, ChangeSet, Column, DbError, IDENTITY_COLUMN, Result, Value};
use crate::storage::StorageEngine;
use super::EntityClass;

const CHANGED_SUFFIX: &str = "_changed";
const WAS_SUFFIX: &str = "_was";

/// One row of an entity table held in memory, with dirty tracking against
/// the last saved state.
#[derive(Debug, Clone)]
pub struct Record {
    class: Arc<EntityClass>,
    token: Uuid,
    attributes: Attributes,
    saved: Attributes,
    previous_changes: ChangeSet,
    persisted: bool,
}

impl Record {
    /// New, unsaved record with every column `NULL`.
    pub fn build(class: Arc<EntityClass>, columns: &[Column]) -> Self {
        let attributes: Attributes = columns
            .iter()
            .map(|col| (col.name.clone(), Value::Null))
            .collect();
        Self {
            class,
            token: Uuid::new_v4(),
            saved: attributes.clone(),
            attributes,
            previous_changes: ChangeSet::new(),
            persisted: false,
        }
    }

    /// Record loaded from the store.
    pub fn instantiate(class: Arc<EntityClass>, attributes: Attributes) -> Self {
        Self {
            class,
            token: Uuid::new_v4(),
            saved: attributes.clone(),
            attributes,
            previous_changes: ChangeSet::new(),
            persisted: true,
        }
    }

    /// Loads record `id` of `class`, if present.
    pub fn find(store: &dyn StorageEngine, class: Arc<EntityClass>, id: i64) -> Result<Option<Self>> {
        Ok(store
            .find(class.table_name(), id)?
            .map(|attributes| Self::instantiate(class, attributes)))
    }

    pub fn class(&self) -> &Arc<EntityClass> {
        &self.class
    }

    pub fn class_name(&self) -> &str {
        self.class.name()
    }

    pub fn table_name(&self) -> &str {
        self.class.table_name()
    }

    /// Identity of this in-memory object, distinct for every build or load.
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn id(&self) -> Option<i64> {
        self.attributes.get(IDENTITY_COLUMN).and_then(Value::as_i64)
    }

    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    pub fn is_new_record(&self) -> bool {
        !self.persisted
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn read_attribute(&self, name: &str) -> Result<Value> {
        self.attributes
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::unknown_member(self.class_name(), name))
    }

    pub fn write_attribute(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        match self.attributes.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(DbError::unknown_member(self.class_name(), name)),
        }
    }

    /// Reads a column or a virtual attribute.
    pub fn get(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.attributes.get(name) {
            return Ok(value.clone());
        }
        match self.class.getter(name) {
            Some(getter) => getter(self),
            None => Err(DbError::unknown_member(self.class_name(), name)),
        }
    }

    /// Writes a column or a virtual attribute.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self.attributes.contains_key(name) {
            return self.write_attribute(name, value);
        }
        match self.class.setter(name).cloned() {
            Some(setter) => setter(self, value.into()),
            None => Err(DbError::unknown_member(self.class_name(), name)),
        }
    }

    /// Invokes a member by name: a class method, a readable attribute, or one
    /// of the dirty-tracking readers `<column>_changed` / `<column>_was`.
    pub fn call(&mut self, member: &str, args: &[Value]) -> Result<Value> {
        if let Some(method) = self.class.method_named(member).cloned() {
            return method(self, args);
        }
        if self.attributes.contains_key(member) || self.class.getter(member).is_some() {
            return self.get(member);
        }
        if let Some(column) = member.strip_suffix(CHANGED_SUFFIX)
            && self.attributes.contains_key(column)
        {
            return Ok(Value::Boolean(self.changes().contains(column)));
        }
        if let Some(column) = member.strip_suffix(WAS_SUFFIX)
            && let Some(value) = self.saved.get(column)
        {
            return Ok(value.clone());
        }
        Err(DbError::unknown_member(self.class_name(), member))
    }

    /// Whether `call` (or `get`/`set`) would find `member`.
    pub fn responds_to(&self, member: &str) -> bool {
        responds_to(&self.class, |name| self.attributes.contains_key(name), member)
    }

    /// Pending changes since the last save.
    pub fn changes(&self) -> ChangeSet {
        ChangeSet::diff(&self.saved, &self.attributes)
    }

    pub fn is_changed(&self) -> bool {
        !self.changes().is_empty()
    }

    /// Changes committed by the most recent save.
    pub fn previous_changes(&self) -> &ChangeSet {
        &self.previous_changes
    }

    /// Inserts or updates the record. Returns `false` when a persisted record
    /// had nothing to write.
    pub fn save(&mut self, store: &mut dyn StorageEngine) -> Result<bool> {
        let table = self.class.table_name().to_string();
        let stored = if self.persisted {
            let pending = self.changes();
            if pending.is_empty() {
                self.previous_changes = ChangeSet::new();
                return Ok(false);
            }
            let id = self.require_id()?;
            let dirty: Attributes = pending
                .iter()
                .map(|(field, change)| (field.to_string(), change.new.clone()))
                .collect();
            store.update(&table, id, dirty)?
        } else {
            let mut insert = self.attributes.clone();
            if insert.get(IDENTITY_COLUMN).is_some_and(Value::is_null) {
                insert.shift_remove(IDENTITY_COLUMN);
            }
            store.insert(&table, insert)?
        };

        self.previous_changes = ChangeSet::diff(&self.saved, &stored);
        self.saved = stored.clone();
        self.attributes = stored;
        self.persisted = true;
        debug!(table = %table, id = ?self.id(), changed = self.previous_changes.len(), "record saved");
        Ok(true)
    }

    /// Writes one column straight to the store, bypassing dirty tracking and
    /// timestamps. The record must already be persisted.
    pub fn update_column(&mut self, store: &mut dyn StorageEngine, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if !self.attributes.contains_key(name) {
            return Err(DbError::unknown_member(self.class_name(), name));
        }
        if !self.persisted {
            return Err(DbError::ConstraintViolation(format!(
                "cannot update column '{}' on a new {} record",
                name,
                self.class_name()
            )));
        }
        let id = self.require_id()?;
        store.update_column(self.class.table_name(), id, name, value.clone())?;
        self.attributes.insert(name.to_string(), value.clone());
        self.saved.insert(name.to_string(), value);
        Ok(())
    }

    /// Replaces in-memory state with the stored row.
    pub fn reload(&mut self, store: &dyn StorageEngine) -> Result<()> {
        let id = self.require_id()?;
        let stored = store
            .find(self.class.table_name(), id)?
            .ok_or_else(|| DbError::RecordNotFound {
                table: self.class.table_name().to_string(),
                id,
            })?;
        self.saved = stored.clone();
        self.attributes = stored;
        Ok(())
    }

    fn require_id(&self) -> Result<i64> {
        self.id().ok_or_else(|| {
            DbError::ConstraintViolation(format!("{} record has no identity", self.class_name()))
        })
    }
}

/// Member lookup shared by records and by class-level capability probes.
pub(crate) fn responds_to(class: &EntityClass, has_column: impl Fn(&str) -> bool, member: &str) -> bool {
    if has_column(member) || class.has_virtual(member) || class.has_method(member) {
        return true;
    }
    [CHANGED_SUFFIX, WAS_SUFFIX]
        .iter()
        .filter_map(|suffix| member.strip_suffix(suffix))
        .any(|column| has_column(column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DataType, FieldChange};
    use crate::storage::{InMemoryStorage, TableSchema};

    fn paint_class() -> Arc<EntityClass> {
        Arc::new(
            EntityClass::new("Paint")
                .reader("shade", |record: &Record| {
                    let color = record.read_attribute("color")?;
                    Ok(Value::Text(format!("{} shade", color)))
                })
                .writer("hex", |record: &mut Record, value: Value| {
                    let color = match value.as_str() {
                        Some("#ff0000") => "red",
                        _ => "unknown",
                    };
                    record.write_attribute("color", color)
                })
                .method("mix", |record: &mut Record, args: &[Value]| {
                    let base = record.read_attribute("color")?;
                    let other = args.first().cloned().unwrap_or_default();
                    Ok(Value::Text(format!("{}+{}", base, other)))
                }),
        )
    }

    fn store() -> InMemoryStorage {
        let mut store = InMemoryStorage::new();
        store
            .create_table(TableSchema::entity(
                "paints",
                vec![Column::new("color", DataType::Text)],
            ))
            .unwrap();
        store
    }

    fn new_paint(store: &InMemoryStorage) -> Record {
        Record::build(paint_class(), &store.columns("paints").unwrap())
    }

    #[test]
    fn test_virtual_members() {
        let store = store();
        let mut paint = new_paint(&store);

        paint.set("hex", "#ff0000").unwrap();
        assert_eq!(paint.get("color").unwrap(), Value::from("red"));
        assert_eq!(paint.get("shade").unwrap(), Value::from("red shade"));
        assert_eq!(paint.call("mix", &["blue".into()]).unwrap(), Value::from("red+blue"));
        assert!(matches!(paint.get("gloss"), Err(DbError::UnknownMember { .. })));
    }

    #[test]
    fn test_save_tracks_previous_changes() {
        let mut store = store();
        let mut paint = new_paint(&store);
        paint.set("color", "red").unwrap();
        assert!(paint.is_changed());

        assert!(paint.save(&mut store).unwrap());
        assert!(paint.is_persisted());
        assert_eq!(paint.id(), Some(1));
        assert!(!paint.is_changed());
        assert_eq!(
            paint.previous_changes().get("color"),
            Some(&FieldChange::new(Value::Null, "red"))
        );

        paint.set("color", "blue").unwrap();
        assert_eq!(paint.call("color_changed", &[]).unwrap(), Value::Boolean(true));
        assert_eq!(paint.call("color_was", &[]).unwrap(), Value::from("red"));
        paint.save(&mut store).unwrap();
        assert_eq!(
            paint.previous_changes().get("color"),
            Some(&FieldChange::new("red", "blue"))
        );

        assert!(!paint.save(&mut store).unwrap());
        assert!(paint.previous_changes().is_empty());
    }

    #[test]
    fn test_responds_to() {
        let store = store();
        let paint = new_paint(&store);
        for member in ["color", "shade", "hex", "mix", "color_changed", "color_was"] {
            assert!(paint.responds_to(member), "{member}");
        }
        assert!(!paint.responds_to("gloss"));
        assert!(!paint.responds_to("gloss_was"));
    }

    #[test]
    fn test_update_column_requires_persisted_record() {
        let mut store = store();
        let mut paint = new_paint(&store);
        assert!(matches!(
            paint.update_column(&mut store, "color", "red"),
            Err(DbError::ConstraintViolation(_))
        ));

        paint.save(&mut store).unwrap();
        paint.update_column(&mut store, "color", "red").unwrap();
        assert!(!paint.is_changed());

        let reloaded = Record::find(&store, paint_class(), 1).unwrap().unwrap();
        assert_eq!(reloaded.get("color").unwrap(), Value::from("red"));
    }

    #[test]
    fn test_reload_discards_unsaved_changes() {
        let mut store = store();
        let mut paint = new_paint(&store);
        paint.set("color", "red").unwrap();
        paint.save(&mut store).unwrap();

        paint.set("color", "green").unwrap();
        paint.reload(&store).unwrap();
        assert_eq!(paint.get("color").unwrap(), Value::from("red"));
        assert!(!paint.is_changed());
    }
}
