use std::collections::HashMap;
use indexmap::IndexMap;
use tracing::debug;
use crate::core::{DbError, Result};
use super::descriptor::AssociationDescriptor;

/// Associations declared by one host class, in declaration order, with a
/// reverse index from every exposed field to the association that owns it.
#[derive(Debug, Clone, Default)]
pub struct AssociationRegistry {
    associations: IndexMap<String, AssociationDescriptor>,
    field_index: HashMap<String, String>,
}

impl AssociationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor. Re-registering an identical declaration is a no-op
    /// and returns `false`. A different declaration under the same name, or
    /// a field already owned by another association, is rejected.
    pub fn register(&mut self, descriptor: AssociationDescriptor) -> Result<bool> {
        if let Some(existing) = self.associations.get(descriptor.name()) {
            if existing.same_declaration(&descriptor) {
                return Ok(false);
            }
            return Err(DbError::Configuration(format!(
                "association '{}' is already declared differently",
                descriptor.name()
            )));
        }

        for field in descriptor.exposed_fields() {
            if let Some(owner) = self.field_index.get(field) {
                return Err(DbError::AmbiguousField {
                    field: field.to_string(),
                    first: owner.clone(),
                    second: descriptor.name().to_string(),
                });
            }
        }

        for field in descriptor.exposed_fields() {
            self.field_index.insert(field.to_string(), descriptor.name().to_string());
        }
        debug!(
            association = descriptor.name(),
            fields = descriptor.fields().len(),
            "association registered"
        );
        self.associations.insert(descriptor.name().to_string(), descriptor);
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<&AssociationDescriptor> {
        self.associations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.associations.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.associations.keys().map(String::as_str).collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &AssociationDescriptor> {
        self.associations.values()
    }

    pub fn len(&self) -> usize {
        self.associations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.associations.is_empty()
    }

    /// Association owning exactly the field `field`.
    pub fn owner_of(&self, field: &str) -> Option<&AssociationDescriptor> {
        self.field_index
            .get(field)
            .and_then(|name| self.associations.get(name))
    }

    /// Owner of `member` by exact field match, falling back to the first
    /// association (in declaration order) with a field contained in
    /// `member`, e.g. `color_was` -> the owner of `color`.
    pub fn owner_matching(&self, member: &str) -> Option<&AssociationDescriptor> {
        self.owner_of(member).or_else(|| {
            self.associations
                .values()
                .find(|descriptor| descriptor.fields().iter().any(|f| member.contains(f.name.as_str())))
        })
    }

    /// Every exposed field across all associations, in declaration order.
    pub fn exposed_fields(&self) -> Vec<&str> {
        self.associations
            .values()
            .flat_map(|descriptor| descriptor.exposed_fields())
            .collect()
    }
}
