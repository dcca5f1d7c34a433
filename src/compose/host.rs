use std::sync::Arc;
use tracing::{debug, warn};
use crate::core::{Column, DbError, Result};
use crate::model::{ClassRegistry, EntityClass, Record};
use crate::storage::StorageEngine;
use super::accessor::AccessorTable;
use super::descriptor::AssociationDescriptor;
use super::instance::HostRecord;
use super::options::{ActsAsOptions, ForeignKeyPolicy};
use super::registry::AssociationRegistry;
use super::rewriter::Filter;
use super::whitelist::exposed_fields;

/// A host class: its own table plus the compositions it declared.
///
/// Built once through [`HostModel::define`] and shared read-only by all of
/// its records.
#[derive(Debug)]
pub struct HostModel {
    class: Arc<EntityClass>,
    columns: Vec<Column>,
    registry: AssociationRegistry,
    accessors: AccessorTable,
}

impl HostModel {
    /// Starts declaring compositions for the class named `host`.
    ///
    /// Fails with a configuration error when the class is unknown or its
    /// table does not exist in `store`.
    pub fn define<'a>(
        store: &'a dyn StorageEngine,
        classes: &'a ClassRegistry,
        host: &str,
    ) -> Result<HostModelBuilder<'a>> {
        let class = classes.resolve(host)?;
        if !store.table_exists(class.table_name()) {
            return Err(DbError::Configuration(format!(
                "{} is not backed by a table ('{}' does not exist)",
                class.name(),
                class.table_name()
            )));
        }
        let columns = store.columns(class.table_name())?;
        Ok(HostModelBuilder {
            store,
            classes,
            model: HostModel {
                class,
                columns,
                registry: AssociationRegistry::new(),
                accessors: AccessorTable::new(),
            },
        })
    }

    pub fn class(&self) -> &Arc<EntityClass> {
        &self.class
    }

    pub fn name(&self) -> &str {
        self.class.name()
    }

    pub fn table_name(&self) -> &str {
        self.class.table_name()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|col| col.name == name)
    }

    pub fn registry(&self) -> &AssociationRegistry {
        &self.registry
    }

    pub fn accessors(&self) -> &AccessorTable {
        &self.accessors
    }

    pub fn association(&self, name: &str) -> Option<&AssociationDescriptor> {
        self.registry.get(name)
    }

    /// Every field delegated to a composed record, in declaration order.
    pub fn delegated_fields(&self) -> Vec<&str> {
        self.registry.exposed_fields()
    }

    /// A new, unsaved host record.
    pub fn new_record(self: &Arc<Self>) -> HostRecord {
        HostRecord::new(Arc::clone(self), Record::build(Arc::clone(&self.class), &self.columns))
    }

    pub fn find(self: &Arc<Self>, store: &dyn StorageEngine, id: i64) -> Result<Option<HostRecord>> {
        Ok(Record::find(store, Arc::clone(&self.class), id)?
            .map(|record| HostRecord::new(Arc::clone(self), record)))
    }

    /// Loads every host record matching `filter`, joining composed tables
    /// as needed.
    pub fn select(self: &Arc<Self>, store: &dyn StorageEngine, filter: Option<&Filter>) -> Result<Vec<HostRecord>> {
        let query = self.rewrite_filter(filter)?;
        let rows = store.select(&query)?;
        Ok(rows
            .into_iter()
            .map(|attributes| {
                HostRecord::new(Arc::clone(self), Record::instantiate(Arc::clone(&self.class), attributes))
            })
            .collect())
    }
}

/// Collects `acts_as` declarations for a host class.
pub struct HostModelBuilder<'a> {
    store: &'a dyn StorageEngine,
    classes: &'a ClassRegistry,
    model: HostModel,
}

impl std::fmt::Debug for HostModelBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostModelBuilder")
            .field("classes", &self.classes)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl<'a> HostModelBuilder<'a> {
    /// Declares that the host is composed over `association`.
    ///
    /// When the composed table does not exist yet the relationship is still
    /// declared but no field is forwarded.
    pub fn acts_as(mut self, association: &str, options: ActsAsOptions) -> Result<Self> {
        let composed = self
            .classes
            .resolve(options.class_name.as_deref().unwrap_or(association))?;
        let foreign_key = ForeignKeyPolicy::resolve(association, options.foreign_key.as_deref());

        if !self.model.has_column(foreign_key.host_column()) {
            return Err(DbError::Configuration(format!(
                "{} has no column '{}' to reference {}",
                self.model.name(),
                foreign_key.host_column(),
                composed.name()
            )));
        }

        if !self.store.table_exists(composed.table_name()) {
            warn!(
                host = self.model.name(),
                association,
                table = composed.table_name(),
                "composed table does not exist, fields are not delegated"
            );
            let descriptor = AssociationDescriptor::unwired(
                association,
                composed,
                foreign_key,
                options.passthrough,
            );
            self.model.registry.register(descriptor)?;
            return Ok(self);
        }

        let composed_columns = self.store.columns(composed.table_name())?;
        let column_names: Vec<String> = composed_columns.iter().map(|col| col.name.clone()).collect();
        let fields = exposed_fields(association, &column_names, &options.prefix, &options.with);

        for field in &fields {
            if self.model.has_column(&field.name) {
                warn!(
                    host = self.model.name(),
                    association,
                    field = %field.name,
                    "host column shadows delegated field"
                );
            }
        }

        let descriptor = AssociationDescriptor::new(
            association,
            composed,
            composed_columns,
            foreign_key,
            fields,
            options.passthrough,
        );
        if self.model.registry.register(descriptor.clone())? {
            let installed = self.model.accessors.install(&descriptor)?;
            debug!(host = self.model.name(), association, installed, "accessors installed");
        }
        Ok(self)
    }

    pub fn build(self) -> Arc<HostModel> {
        Arc::new(self.model)
    }
}
