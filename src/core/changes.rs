use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use super::{Attributes, Value};

/// Old and new value of one changed field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChange {
    pub old: Value,
    pub new: Value,
}

impl FieldChange {
    pub fn new(old: impl Into<Value>, new: impl Into<Value>) -> Self {
        Self {
            old: old.into(),
            new: new.into(),
        }
    }
}

/// Field name to `(old, new)` mapping, in the order fields were first changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    changes: IndexMap<String, FieldChange>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the fields of `current` whose value differs from `original`.
    ///
    /// A field missing from `original` counts as previously `NULL`.
    pub fn diff(original: &Attributes, current: &Attributes) -> Self {
        let mut changes = IndexMap::new();
        for (name, value) in current {
            let old = original.get(name).cloned().unwrap_or(Value::Null);
            if old != *value {
                changes.insert(name.clone(), FieldChange { old, new: value.clone() });
            }
        }
        Self { changes }
    }

    pub fn insert(&mut self, field: impl Into<String>, change: FieldChange) {
        self.changes.insert(field.into(), change);
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.changes.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.changes.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldChange)> {
        self.changes.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns a new set with `other` layered on top; `other` wins on collisions.
    pub fn merged(&self, other: &ChangeSet) -> ChangeSet {
        let mut merged = self.clone();
        for (field, change) in &other.changes {
            merged.changes.insert(field.clone(), change.clone());
        }
        merged
    }
}

impl<K: Into<String>> FromIterator<(K, FieldChange)> for ChangeSet {
    fn from_iter<I: IntoIterator<Item = (K, FieldChange)>>(iter: I) -> Self {
        Self {
            changes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
