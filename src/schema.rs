//! Record type declarations.
//!
//! A [`Schema`] is the ordered field list of one record type. Its enumeration
//! order is the row layout: table creation, insert, update, and decoding all
//! walk [`Schema::fields`], so column positions cannot drift between them.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::field::FieldType;

/// Names starting with this prefix are never part of a schema.
pub const RESERVED_PREFIX: char = '_';

/// Name of the engine-assigned identity column.
pub const IDENTITY_COLUMN: &str = "rowid";

/// One declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    ty: FieldType,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }
}

/// A named, ordered field set. The name doubles as the table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    fields: Vec<Field>,
}

impl Schema {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Record types this schema points at, in field order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|f| f.ty.reference_target())
    }

    /// Looks up `name` and returns an error naming this record type when absent.
    pub(crate) fn require_field(&self, name: &str) -> Result<&Field> {
        self.field(name).ok_or_else(|| Error::UnknownField {
            table: self.name.clone(),
            field: name.to_string(),
        })
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        for field in &self.fields {
            writeln!(f, "  {}: {}", field.name, field.ty)?;
        }
        Ok(())
    }
}

/// Builds a [`Schema`] one field at a time.
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<Field>,
}

impl SchemaBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        let name = name.into();
        if name.starts_with(RESERVED_PREFIX) {
            debug!(table = %self.name, field = %name, "skipping reserved field name");
            return self;
        }
        self.fields.push(Field::new(name, ty));
        self
    }

    pub fn boolean(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Boolean)
    }

    pub fn integer(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Integer)
    }

    pub fn float(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Float)
    }

    pub fn text(self, name: impl Into<String>) -> Self {
        self.field(name, FieldType::Text)
    }

    pub fn reference(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.field(name, FieldType::Reference(target.into()))
    }

    pub fn build(self) -> Result<Arc<Schema>> {
        validate_identifier(&self.name)?;
        if self.fields.is_empty() {
            return Err(Error::EmptySchema { name: self.name });
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            validate_identifier(&field.name)?;
            if let Some(target) = field.ty.reference_target() {
                validate_identifier(target)?;
            }
            if !seen.insert(field.name.to_ascii_lowercase()) {
                return Err(Error::DuplicateField {
                    table: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(Arc::new(Schema {
            name: self.name,
            fields: self.fields,
        }))
    }
}

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`, excluding the identity column name.
pub(crate) fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid = valid_start
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.eq_ignore_ascii_case(IDENTITY_COLUMN);
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}
