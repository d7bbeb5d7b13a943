//! Registered record types, keyed by name.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{Error, Result};
use crate::schema::Schema;

/// Record types known to a [`crate::Database`].
///
/// References are resolved by name when they are used, so record types may
/// be registered in any order.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: RwLock<HashMap<String, Arc<Schema>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, schema: Arc<Schema>) -> Result<()> {
        let mut schemas = self.schemas.write().map_err(|_| Error::LockPoisoned)?;
        if schemas.contains_key(schema.name()) {
            return Err(Error::DuplicateRecordType {
                name: schema.name().to_string(),
            });
        }
        debug!(record_type = %schema.name(), fields = schema.len(), "registered record type");
        schemas.insert(schema.name().to_string(), schema);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<Schema>> {
        let schemas = self.schemas.read().map_err(|_| Error::LockPoisoned)?;
        schemas
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownRecordType {
                name: name.to_string(),
            })
    }

    /// The registered schema named like `schema`, which must declare the
    /// same fields in the same order.
    pub fn resolve(&self, schema: &Schema) -> Result<Arc<Schema>> {
        let registered = self.get(schema.name())?;
        if *registered != *schema {
            return Err(Error::SchemaMismatch {
                name: schema.name().to_string(),
            });
        }
        Ok(registered)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas
            .read()
            .map(|schemas| schemas.contains_key(name))
            .unwrap_or(false)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .schemas
            .read()
            .map(|schemas| schemas.keys().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student() -> Arc<Schema> {
        Schema::builder("Student").text("eid").build().unwrap()
    }

    #[test]
    fn test_register_and_get() {
        let registry = Registry::new();
        registry.register(student()).unwrap();

        assert!(registry.contains("Student"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("Student").unwrap().name(), "Student");
    }

    #[test]
    fn test_duplicate_registration() {
        let registry = Registry::new();
        registry.register(student()).unwrap();

        let result = registry.register(student());
        assert!(matches!(result, Err(Error::DuplicateRecordType { .. })));
    }

    #[test]
    fn test_unknown_record_type() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(matches!(
            registry.get("Course"),
            Err(Error::UnknownRecordType { .. })
        ));
    }

    #[test]
    fn test_resolve_requires_identical_declaration() {
        let registry = Registry::new();
        let pt = Schema::builder("Pt").integer("x").integer("y").build().unwrap();
        registry.register(pt.clone()).unwrap();

        let same = Schema::builder("Pt").integer("x").integer("y").build().unwrap();
        assert!(Arc::ptr_eq(&registry.resolve(&same).unwrap(), &pt));

        let swapped = Schema::builder("Pt").integer("y").integer("x").build().unwrap();
        assert!(matches!(
            registry.resolve(&swapped),
            Err(Error::SchemaMismatch { .. })
        ));
        assert!(matches!(
            registry.resolve(&student()),
            Err(Error::UnknownRecordType { .. })
        ));
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let registry = Registry::new();
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = registry.schemas.write().unwrap();
            panic!("poison");
        }));
        assert!(matches!(registry.get("Student"), Err(Error::LockPoisoned)));
        assert!(matches!(
            registry.register(student()),
            Err(Error::LockPoisoned)
        ));
    }

    #[test]
    fn test_names_sorted() {
        let registry = Registry::new();
        registry
            .register(Schema::builder("Student").text("eid").build().unwrap())
            .unwrap();
        registry
            .register(Schema::builder("Course").text("name").build().unwrap())
            .unwrap();
        assert_eq!(registry.names(), vec!["Course", "Student"]);
    }
}
