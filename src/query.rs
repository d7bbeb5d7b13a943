//! Equality-filtered selection and the row snapshot it produces.

use std::sync::Arc;

use crate::connector::Row;
use crate::database::Database;
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::schema::{Schema, IDENTITY_COLUMN};
use crate::value::Value;

/// Equality conditions, applied in insertion order and joined with `AND`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }
}

pub fn select_sql(schema: &Schema, filter: &Filter) -> Result<String> {
    let mut sql = format!("SELECT {}, * FROM {}", IDENTITY_COLUMN, schema.name());
    if filter.is_empty() {
        return Ok(sql);
    }
    let predicates = filter
        .conditions()
        .iter()
        .map(|(name, value)| -> Result<String> {
            let field = schema.require_field(name)?;
            let literal = field.ty().to_storage(schema.name(), name, value)?;
            Ok(format!("{}={}", name, literal))
        })
        .collect::<Result<Vec<_>>>()?;
    sql.push_str(" WHERE ");
    sql.push_str(&predicates.join(" AND "));
    Ok(sql)
}

/// Rows matched when the query ran. Instances are decoded on each access
/// and never cached, so two reads of one row yield two equal instances.
pub struct QuerySet<'db> {
    db: &'db Database,
    schema: Arc<Schema>,
    rows: Vec<Row>,
}

impl<'db> QuerySet<'db> {
    pub(crate) fn new(db: &'db Database, schema: Arc<Schema>, rows: Vec<Row>) -> Self {
        Self { db, schema, rows }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<Instance> {
        let row = self.rows.get(index).ok_or(Error::IndexOutOfBounds {
            index,
            len: self.rows.len(),
        })?;
        self.db.decode(&self.schema, row)
    }

    pub fn first(&self) -> Option<Result<Instance>> {
        (!self.rows.is_empty()).then(|| self.get(0))
    }

    /// Decodes every row again from the snapshot.
    pub fn iter(&self) -> impl Iterator<Item = Result<Instance>> + '_ {
        self.rows.iter().map(move |row| self.db.decode(&self.schema, row))
    }

    pub fn to_vec(&self) -> Result<Vec<Instance>> {
        self.iter().collect()
    }
}

impl std::fmt::Debug for QuerySet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySet")
            .field("table", &self.schema.name())
            .field("rows", &self.rows.len())
            .finish()
    }
}
