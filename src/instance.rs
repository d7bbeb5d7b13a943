//! Live records bound to a schema.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::schema::{Schema, RESERVED_PREFIX};
use crate::value::Value;

/// One record of a declared type.
///
/// `id` stays `None` until the first save assigns the engine's row id.
/// Names under the reserved prefix are kept in memory only.
#[derive(Debug, Clone)]
pub struct Instance {
    schema: Arc<Schema>,
    id: Option<i64>,
    values: HashMap<String, Value>,
    extras: HashMap<String, Value>,
}

impl Instance {
    pub fn new(schema: &Arc<Schema>) -> Self {
        Self {
            schema: Arc::clone(schema),
            id: None,
            values: HashMap::new(),
            extras: HashMap::new(),
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn table_name(&self) -> &str {
        self.schema.name()
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn set_id(&mut self, id: Option<i64>) {
        self.id = id;
    }

    /// Assigns a field, checking it against the schema's declared type.
    ///
    /// A reference holds a copy of its target taken now, so the target must
    /// already be saved.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        if name.starts_with(RESERVED_PREFIX) {
            self.extras.insert(name.to_string(), value);
            return Ok(());
        }
        let field = self.schema.require_field(name)?;
        if !field.ty().accepts(&value) {
            return Err(Error::type_mismatch(
                self.schema.name(),
                name,
                field.ty().to_string(),
                value.kind(),
            ));
        }
        if matches!(&value, Value::Reference(target) if !target.is_persisted()) {
            return Err(Error::UnpersistedReference {
                table: self.schema.name().to_string(),
                field: name.to_string(),
            });
        }
        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Chained form of [`Instance::set`].
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Result<Self> {
        self.set(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        if name.starts_with(RESERVED_PREFIX) {
            self.extras.get(name)
        } else {
            self.values.get(name)
        }
    }

    /// Value of a schema field, failing when it has not been assigned.
    pub(crate) fn require(&self, name: &str) -> Result<&Value> {
        self.values.get(name).ok_or_else(|| Error::MissingValue {
            table: self.schema.name().to_string(),
            field: name.to_string(),
        })
    }

    // Decoding assigns values that were already type-checked by the field.
    pub(crate) fn insert_decoded(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }
}

impl PartialEq for Instance {
    /// Same record type, identity, and persisted field values.
    fn eq(&self, other: &Self) -> bool {
        self.schema.name() == other.schema.name()
            && self.id == other.id
            && self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord() -> Arc<Schema> {
        Schema::builder("Coord3D")
            .integer("x")
            .integer("y")
            .integer("z")
            .build()
            .unwrap()
    }

    #[test]
    fn test_set_and_get() {
        let p = Instance::new(&coord())
            .with("x", 1)
            .unwrap()
            .with("y", 2)
            .unwrap();
        assert_eq!(p.get("x"), Some(&Value::Integer(1)));
        assert_eq!(p.get("z"), None);
        assert!(!p.is_persisted());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let mut p = Instance::new(&coord());
        assert!(matches!(
            p.set("w", 4),
            Err(Error::UnknownField { .. })
        ));
    }

    #[test]
    fn test_wrong_type_rejected() {
        let mut p = Instance::new(&coord());
        let err = p.set("x", "one").unwrap_err();
        assert_eq!(
            err.to_string(),
            "field 'Coord3D.x' expects integer, got text"
        );
    }

    #[test]
    fn test_reference_target_must_be_saved() {
        let line = Schema::builder("Line")
            .reference("start", "Coord3D")
            .build()
            .unwrap();
        let mut origin = Instance::new(&coord()).with("x", 0).unwrap();
        let mut l = Instance::new(&line);

        assert!(matches!(
            l.set("start", &origin),
            Err(Error::UnpersistedReference { .. })
        ));
        assert_eq!(l.get("start"), None);

        origin.set_id(Some(3));
        l.set("start", &origin).unwrap();
        let held = l.get("start").and_then(Value::as_reference).unwrap();
        assert_eq!(held.id(), Some(3));
    }

    #[test]
    fn test_reserved_names_stay_in_memory() {
        let mut p = Instance::new(&coord());
        p.set("_label", "origin").unwrap();
        assert_eq!(p.get("_label"), Some(&Value::Text("origin".into())));
        assert!(matches!(p.require("x"), Err(Error::MissingValue { .. })));
    }

    #[test]
    fn test_equality_ignores_extras() {
        let a = Instance::new(&coord()).with("x", 1).unwrap();
        let b = a.clone().with("_note", "scratch").unwrap();
        assert_eq!(a, b);

        let c = a.clone().with("x", 2).unwrap();
        assert_ne!(a, c);
    }
}
