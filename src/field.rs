//! Column descriptors: storage type plus the conversion pair for one field.

use std::fmt;

use crate::error::{Error, Result};
use crate::value::{DataType, Literal, SqlValue, Value};

/// The closed set of field kinds a record type can declare.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Boolean,
    Integer,
    Float,
    Text,
    /// Holds the identity of a row in the named record type.
    Reference(String),
}

impl FieldType {
    pub fn storage_type(&self) -> DataType {
        match self {
            FieldType::Boolean | FieldType::Integer | FieldType::Reference(_) => DataType::Integer,
            FieldType::Float => DataType::Real,
            FieldType::Text => DataType::Text,
        }
    }

    pub fn column_declaration(&self, name: &str) -> String {
        format!("{} {}", name, self.storage_type())
    }

    /// Table-level constraint emitted after every column declaration.
    pub fn post_declaration_constraint(&self, name: &str) -> Option<String> {
        match self {
            FieldType::Reference(target) => Some(format!(
                "FOREIGN KEY({}) REFERENCES {}(rowid)",
                name, target
            )),
            _ => None,
        }
    }

    pub fn reference_target(&self) -> Option<&str> {
        match self {
            FieldType::Reference(target) => Some(target),
            _ => None,
        }
    }

    /// Whether `value` may be assigned to a field of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (FieldType::Boolean, Value::Boolean(_))
            | (FieldType::Integer, Value::Integer(_))
            | (FieldType::Float, Value::Float(_))
            | (FieldType::Text, Value::Text(_)) => true,
            (FieldType::Reference(target), Value::Reference(other)) => other.table_name() == target,
            _ => false,
        }
    }

    /// Renders `value` as a statement literal for the column `table.name`.
    pub fn to_storage(&self, table: &str, name: &str, value: &Value) -> Result<Literal> {
        if !self.accepts(value) {
            return Err(Error::type_mismatch(table, name, self.to_string(), found(value)));
        }
        match value {
            Value::Boolean(b) => Ok(Literal::new(if *b { "1" } else { "0" })),
            Value::Integer(i) => Ok(Literal::new(i.to_string())),
            Value::Float(f) if !f.is_finite() => Err(Error::NonFiniteFloat {
                field: format!("{}.{}", table, name),
            }),
            // Debug formatting is the shortest text that parses back to the same f64.
            Value::Float(f) => Ok(Literal::new(format!("{:?}", f))),
            Value::Text(s) => Ok(Literal::quoted(s)),
            Value::Reference(instance) => instance
                .id()
                .map(|id| Literal::new(id.to_string()))
                .ok_or_else(|| Error::UnpersistedReference {
                    table: table.to_string(),
                    field: name.to_string(),
                }),
        }
    }

    /// Converts a stored column back into a field value.
    ///
    /// Reference columns only hold an identity; they are resolved by a
    /// separate lookup when the row is decoded.
    pub fn from_storage(&self, table: &str, name: &str, raw: SqlValue) -> Result<Value> {
        match (self, raw) {
            (FieldType::Boolean, SqlValue::Integer(i)) => Ok(Value::Boolean(i != 0)),
            (FieldType::Integer, SqlValue::Integer(i)) => Ok(Value::Integer(i)),
            (FieldType::Float, SqlValue::Real(r)) => Ok(Value::Float(r)),
            (FieldType::Float, SqlValue::Integer(i)) => Ok(Value::Float(i as f64)),
            (FieldType::Text, SqlValue::Text(s)) => Ok(Value::Text(s)),
            (FieldType::Reference(_), _) => Err(Error::Unsupported {
                field: format!("{}.{}", table, name),
                operation: "direct decoding of a reference".to_string(),
            }),
            (ty, raw) => Err(Error::type_mismatch(table, name, ty.to_string(), raw.kind())),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::Integer => f.write_str("integer"),
            FieldType::Float => f.write_str("float"),
            FieldType::Text => f.write_str("text"),
            FieldType::Reference(target) => write!(f, "reference to {}", target),
        }
    }
}

fn found(value: &Value) -> String {
    match value {
        Value::Reference(other) => format!("reference to {}", other.table_name()),
        other => other.kind().to_string(),
    }
}
