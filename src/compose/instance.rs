use std::sync::Arc;
use indexmap::IndexMap;
use tracing::debug;
use crate::core::{Attributes, ChangeSet, DbError, IDENTITY_COLUMN, Result, Value};
use crate::model::{JsonSource, Record, SerializeOptions, as_json};
use crate::storage::StorageEngine;
use super::descriptor::AssociationDescriptor;
use super::host::HostModel;
use super::options::ForeignKeyPolicy;

/// One host record together with the composed records it has materialized.
///
/// Each composed record is created at most once per host record and then
/// reused, so repeated access always reaches the same object.
#[derive(Debug, Clone)]
pub struct HostRecord {
    model: Arc<HostModel>,
    record: Record,
    composed: IndexMap<String, Record>,
}

impl HostRecord {
    pub(crate) fn new(model: Arc<HostModel>, record: Record) -> Self {
        Self {
            model,
            record,
            composed: IndexMap::new(),
        }
    }

    pub fn model(&self) -> &Arc<HostModel> {
        &self.model
    }

    /// The host's own record.
    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    pub fn id(&self) -> Option<i64> {
        self.record.id()
    }

    pub fn is_persisted(&self) -> bool {
        self.record.is_persisted()
    }

    /// Composed record of `association` if it was already materialized.
    pub fn cached(&self, association: &str) -> Option<&Record> {
        self.composed.get(association)
    }

    // ========================================================================
    // Materialization
    // ========================================================================

    /// Returns the composed record of `association`, creating it on first
    /// access: the linked record if one is stored, else (shared key) a new
    /// record carrying the host's identity, else a freshly built record.
    /// When the host is persisted and the composed record is not, the
    /// composed record is saved before it is returned.
    pub fn association(&mut self, store: &mut dyn StorageEngine, name: &str) -> Result<&mut Record> {
        let model = Arc::clone(&self.model);
        let descriptor = model
            .association(name)
            .ok_or_else(|| DbError::unknown_member(model.name(), name))?;

        if !self.composed.contains_key(name) {
            let resolved = self.resolve(&*store, descriptor)?;
            self.composed.insert(name.to_string(), resolved);
        }

        let host_id = self.record.id();
        let host_persisted = self.record.is_persisted();
        let composed = self.composed.get_mut(name).ok_or_else(|| DbError::MaterializationFailed {
            association: name.to_string(),
            reason: "composed record missing from cache".to_string(),
        })?;

        if host_persisted && composed.is_new_record() {
            if descriptor.foreign_key().is_shared() && composed.id().is_none() {
                composed.write_attribute(IDENTITY_COLUMN, Value::from(host_id))?;
            }
            composed.save(store)?;
            debug!(host = model.name(), association = name, id = ?composed.id(), "composed record persisted");

            if let ForeignKeyPolicy::Standard { column } = descriptor.foreign_key() {
                let link = Value::from(composed.id());
                if self.record.read_attribute(column)? != link {
                    self.record.update_column(store, column, link)?;
                }
            }
        }
        Ok(composed)
    }

    fn resolve(&self, store: &dyn StorageEngine, descriptor: &AssociationDescriptor) -> Result<Record> {
        let class = descriptor.composed_class();
        if !store.table_exists(class.table_name()) {
            return Err(DbError::MaterializationFailed {
                association: descriptor.name().to_string(),
                reason: format!("table '{}' does not exist", class.table_name()),
            });
        }

        let link = self
            .record
            .attributes()
            .get(descriptor.foreign_key().host_column())
            .and_then(Value::as_i64);

        if let Some(id) = link
            && let Some(found) = Record::find(store, Arc::clone(class), id)?
        {
            debug!(association = descriptor.name(), id, "composed record loaded");
            return Ok(found);
        }

        let columns = store.columns(class.table_name())?;
        let mut built = Record::build(Arc::clone(class), &columns);
        if descriptor.foreign_key().is_shared()
            && let Some(id) = link
        {
            built.write_attribute(IDENTITY_COLUMN, id)?;
        }
        debug!(association = descriptor.name(), shared = descriptor.foreign_key().is_shared(), "composed record built");
        Ok(built)
    }

    // ========================================================================
    // Member access
    // ========================================================================

    /// Reads `field` from the host, or from the composed record that owns it.
    pub fn read(&mut self, store: &mut dyn StorageEngine, field: &str) -> Result<Value> {
        self.call(store, field, &[])
    }

    /// Writes `field` on the host, or on the composed record that owns it.
    pub fn write(&mut self, store: &mut dyn StorageEngine, field: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if self.record.has_attribute(field) || self.record.class().setter(field).is_some() {
            return self.record.set(field, value);
        }

        let model = Arc::clone(&self.model);
        match model.accessors().get(field) {
            Some(accessor) => {
                let composed = self.association(store, accessor.association())?;
                accessor.write(composed, value).map_err(|err| match err {
                    // read-only delegated member: report it against the host
                    DbError::UnknownMember { member, .. } if member == accessor.target() => {
                        DbError::unknown_member(model.name(), field)
                    }
                    other => other,
                })
            }
            None => Err(DbError::unknown_member(model.name(), field)),
        }
    }

    /// Invokes `member`: host members first, then delegated fields, then the
    /// dynamic router.
    pub fn call(&mut self, store: &mut dyn StorageEngine, member: &str, args: &[Value]) -> Result<Value> {
        if self.record.responds_to(member) {
            return self.record.call(member, args);
        }

        let model = Arc::clone(&self.model);
        if let Some(accessor) = model.accessors().get(member) {
            let composed = self.association(store, accessor.association())?;
            return accessor.invoke(composed, args);
        }
        self.route(store, member, args)
    }

    /// Forwards a member no host field or accessor handles to the first
    /// association owning a field contained in the member name, provided the
    /// composed record answers to it; otherwise fails as an unknown member.
    pub fn route(&mut self, store: &mut dyn StorageEngine, member: &str, args: &[Value]) -> Result<Value> {
        let model = Arc::clone(&self.model);
        match model.registry().owner_matching(member) {
            Some(descriptor) if descriptor.composed_responds_to(member) => {
                let composed = self.association(store, descriptor.name())?;
                composed.call(member, args)
            }
            _ => Err(DbError::unknown_member(model.name(), member)),
        }
    }

    /// Whether `call` would find `member`, delegated members included.
    pub fn responds_to(&self, member: &str) -> bool {
        if self.record.responds_to(member) || self.model.accessors().contains(member) {
            return true;
        }
        self.model
            .registry()
            .owner_matching(member)
            .is_some_and(|descriptor| descriptor.composed_responds_to(member))
    }

    /// Writes one column straight to the store on whichever record owns it.
    pub fn update_column(&mut self, store: &mut dyn StorageEngine, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if self.record.has_attribute(name) {
            return self.record.update_column(store, name, value);
        }

        let model = Arc::clone(&self.model);
        match model.accessors().get(name) {
            Some(accessor) => {
                let composed = self.association(store, accessor.association())?;
                composed.update_column(store, accessor.target(), value)
            }
            None => Err(DbError::unknown_member(model.name(), name)),
        }
    }

    // ========================================================================
    // Change tracking
    // ========================================================================

    /// Changes committed by the last save, host and composed records merged.
    /// Later associations win on a field collision.
    pub fn previous_changes(&mut self, store: &mut dyn StorageEngine) -> Result<ChangeSet> {
        let model = Arc::clone(&self.model);
        let mut merged = self.record.previous_changes().clone();
        for descriptor in model.registry().descriptors().filter(|d| d.is_wired()) {
            let composed = self.association(store, descriptor.name())?;
            merged = merged.merged(composed.previous_changes());
        }
        Ok(merged)
    }

    /// Pending changes on the host and on every materialized composed record.
    pub fn changes(&self) -> ChangeSet {
        self.composed
            .values()
            .fold(self.record.changes(), |merged, composed| merged.merged(&composed.changes()))
    }

    pub fn is_changed(&self) -> bool {
        !self.changes().is_empty()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Saves new or changed composed records, then the host. A new host first
    /// materializes every wired association, so a composed record that cannot
    /// be saved leaves the host unsaved as well. Returns `true` when any
    /// record was written.
    pub fn save(&mut self, store: &mut dyn StorageEngine) -> Result<bool> {
        let model = Arc::clone(&self.model);

        if self.record.is_new_record() {
            for descriptor in model.registry().descriptors().filter(|d| d.is_wired()) {
                self.association(store, descriptor.name())?;
            }
        }

        let mut composed_saved = false;
        for descriptor in model.registry().descriptors() {
            let Some(composed) = self.composed.get_mut(descriptor.name()) else {
                continue;
            };
            if !(composed.is_new_record() || composed.is_changed()) {
                continue;
            }
            match descriptor.foreign_key() {
                ForeignKeyPolicy::SharedPrimaryKey => {
                    if composed.id().is_none()
                        && let Some(id) = self.record.id()
                    {
                        composed.write_attribute(IDENTITY_COLUMN, id)?;
                    }
                    composed_saved |= composed.save(store)?;
                    if self.record.id().is_none() {
                        self.record.write_attribute(IDENTITY_COLUMN, Value::from(composed.id()))?;
                    }
                }
                ForeignKeyPolicy::Standard { column } => {
                    composed_saved |= composed.save(store)?;
                    self.record.write_attribute(column, Value::from(composed.id()))?;
                }
            }
        }

        let saved = self.record.save(store)?;
        Ok(saved || composed_saved)
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    /// Serializes the host with every delegated field included as if it were
    /// a host field. Caller-supplied `methods` are kept.
    pub fn as_json(&mut self, store: &mut dyn StorageEngine, options: &SerializeOptions) -> Result<serde_json::Value> {
        let mut options = options.clone();
        options.union_methods(self.model.delegated_fields());
        let mut source = HostJson { host: self, store };
        as_json(&mut source, &options)
    }
}

struct HostJson<'h, 's> {
    host: &'h mut HostRecord,
    store: &'s mut dyn StorageEngine,
}

impl JsonSource for HostJson<'_, '_> {
    fn json_attributes(&self) -> Attributes {
        self.host.record.attributes().clone()
    }

    fn json_member(&mut self, name: &str) -> Result<Value> {
        self.host.read(self.store, name)
    }
}
