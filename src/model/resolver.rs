use std::sync::Arc;
use convert_case::{Case, Casing};
use indexmap::IndexMap;
use crate::core::{DbError, Result};
use super::EntityClass;

/// Camel-cases an association or class identifier: `paint_job` -> `PaintJob`.
pub fn class_name_for(ident: &str) -> String {
    ident.to_case(Case::Pascal)
}

/// Default table for a class: snake case plus a plural `s`.
pub fn default_table_name(class_name: &str) -> String {
    format!("{}s", class_name.to_case(Case::Snake))
}

/// Name -> entity class lookup used when a composition is declared.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: IndexMap<String, Arc<EntityClass>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `class`, replacing any class with the same name.
    pub fn register(&mut self, class: EntityClass) -> Arc<EntityClass> {
        let class = Arc::new(class);
        self.classes.insert(class.name().to_string(), Arc::clone(&class));
        class
    }

    pub fn get(&self, name: &str) -> Option<Arc<EntityClass>> {
        self.classes.get(name).cloned()
    }

    /// Resolves an identifier such as `paint_job` or `PaintJob` to its class.
    pub fn resolve(&self, ident: &str) -> Result<Arc<EntityClass>> {
        let name = class_name_for(ident);
        self.get(&name)
            .ok_or_else(|| DbError::Configuration(format!("uninitialized class {}", name)))
    }

    pub fn names(&self) -> Vec<&str> {
        self.classes.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming() {
        assert_eq!(class_name_for("paint"), "Paint");
        assert_eq!(class_name_for("paint_job"), "PaintJob");
        assert_eq!(default_table_name("PaintJob"), "paint_jobs");
    }

    #[test]
    fn test_resolve_camelcases_identifier() {
        let mut classes = ClassRegistry::new();
        classes.register(EntityClass::new("PaintJob"));

        assert_eq!(classes.resolve("paint_job").unwrap().table_name(), "paint_jobs");
        assert_eq!(classes.resolve("PaintJob").unwrap().name(), "PaintJob");
        assert!(matches!(classes.resolve("engine"), Err(DbError::Configuration(_))));
    }
}
