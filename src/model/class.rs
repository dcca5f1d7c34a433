use std::fmt;
use std::sync::Arc;
use indexmap::IndexMap;
use crate::core::{Result, Value};
use super::Record;
use super::resolver::default_table_name;

pub type Getter = Arc<dyn Fn(&Record) -> Result<Value> + Send + Sync>;
pub type Setter = Arc<dyn Fn(&mut Record, Value) -> Result<()> + Send + Sync>;
pub type Method = Arc<dyn Fn(&mut Record, &[Value]) -> Result<Value> + Send + Sync>;

#[derive(Clone, Default)]
struct VirtualAttribute {
    getter: Option<Getter>,
    setter: Option<Setter>,
}

/// Entity type: the table its records live in plus the non-column members
/// (virtual attributes and methods) its records answer to.
#[derive(Clone)]
pub struct EntityClass {
    name: String,
    table: String,
    virtuals: IndexMap<String, VirtualAttribute>,
    methods: IndexMap<String, Method>,
}

impl EntityClass {
    /// Creates a class whose table name is derived from `name`
    /// (`PaintJob` -> `paint_jobs`).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = default_table_name(&name);
        Self {
            name,
            table,
            virtuals: IndexMap::new(),
            methods: IndexMap::new(),
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Read side of a virtual attribute.
    pub fn reader<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Record) -> Result<Value> + Send + Sync + 'static,
    {
        self.virtuals.entry(name.into()).or_default().getter = Some(Arc::new(getter));
        self
    }

    /// Write side of a virtual attribute.
    pub fn writer<F>(mut self, name: impl Into<String>, setter: F) -> Self
    where
        F: Fn(&mut Record, Value) -> Result<()> + Send + Sync + 'static,
    {
        self.virtuals.entry(name.into()).or_default().setter = Some(Arc::new(setter));
        self
    }

    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut Record, &[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn getter(&self, name: &str) -> Option<&Getter> {
        self.virtuals.get(name).and_then(|attr| attr.getter.as_ref())
    }

    pub fn setter(&self, name: &str) -> Option<&Setter> {
        self.virtuals.get(name).and_then(|attr| attr.setter.as_ref())
    }

    pub fn method_named(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn has_virtual(&self, name: &str) -> bool {
        self.virtuals.contains_key(name)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }
}

impl fmt::Debug for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityClass")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("virtuals", &self.virtuals.keys().collect::<Vec<_>>())
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}
