//! Translation between instances and rows.
//!
//! Rows read back by the mapper always have the shape
//! `(rowid, field_1, field_2, ...)` with fields in schema order.

use std::sync::Arc;

use tracing::debug;

use crate::connector::{Row, Session};
use crate::error::{Error, Result};
use crate::instance::Instance;
use crate::registry::Registry;
use crate::schema::{Schema, IDENTITY_COLUMN};
use crate::table::ensure_table_exists;
use crate::value::{Literal, SqlValue, Value};

/// Field literals in schema order.
fn encode(instance: &Instance) -> Result<Vec<(&str, Literal)>> {
    let table = instance.table_name();
    instance
        .schema()
        .fields()
        .map(|field| {
            let value = instance.require(field.name())?;
            let literal = field.ty().to_storage(table, field.name(), value)?;
            Ok((field.name(), literal))
        })
        .collect()
}

pub fn insert_sql(instance: &Instance) -> Result<String> {
    let values: Vec<String> = encode(instance)?
        .into_iter()
        .map(|(_, literal)| literal.to_string())
        .collect();
    Ok(format!(
        "INSERT INTO {} VALUES ({})",
        instance.table_name(),
        values.join(", ")
    ))
}

/// Rewrites every field; requires an identity.
pub fn update_sql(instance: &Instance) -> Result<String> {
    let id = persisted_id(instance)?;
    let assignments: Vec<String> = encode(instance)?
        .into_iter()
        .map(|(name, literal)| format!("{}={}", name, literal))
        .collect();
    Ok(format!(
        "UPDATE {} SET {} WHERE {}={}",
        instance.table_name(),
        assignments.join(", "),
        IDENTITY_COLUMN,
        id
    ))
}

pub fn delete_sql(instance: &Instance) -> Result<String> {
    let id = persisted_id(instance)?;
    Ok(format!(
        "DELETE FROM {} WHERE {}={}",
        instance.table_name(),
        IDENTITY_COLUMN,
        id
    ))
}

pub fn select_by_id_sql(table: &str, id: i64) -> String {
    format!(
        "SELECT {col}, * FROM {} WHERE {col}={} LIMIT 1",
        table,
        id,
        col = IDENTITY_COLUMN
    )
}

fn persisted_id(instance: &Instance) -> Result<i64> {
    instance.id().ok_or_else(|| Error::MissingValue {
        table: instance.table_name().to_string(),
        field: IDENTITY_COLUMN.to_string(),
    })
}

/// Registered schema of `instance`. The instance and every record it
/// references must be built on the registered declarations, so rows are
/// written in the layout `decode` reads back.
fn registered_schema(registry: &Registry, instance: &Instance) -> Result<Arc<Schema>> {
    let schema = registry.resolve(instance.schema())?;
    for field in schema.fields() {
        if let Some(target) = instance.get(field.name()).and_then(Value::as_reference) {
            registry.resolve(target.schema())?;
        }
    }
    Ok(schema)
}

/// Inserts a new row or rewrites the existing one, creating tables as needed.
///
/// A first save stores the engine-assigned row id on `instance`.
pub(crate) fn save(session: &Session<'_>, registry: &Registry, instance: &mut Instance) -> Result<()> {
    let schema = registered_schema(registry, instance)?;
    ensure_table_exists(session, registry, &schema)?;
    match instance.id() {
        None => {
            let cursor = session.execute(&insert_sql(instance)?)?;
            let id = cursor.last_insert_rowid();
            instance.set_id(Some(id));
            debug!(table = %instance.table_name(), id = id, "inserted");
        }
        Some(id) => {
            session.execute(&update_sql(instance)?)?;
            debug!(table = %instance.table_name(), id = id, "updated");
        }
    }
    Ok(())
}

/// Removes the row behind `instance`. Rows referencing it are left alone.
///
/// Returns whether a row was removed; an unsaved instance removes nothing.
pub(crate) fn delete(session: &Session<'_>, registry: &Registry, instance: &Instance) -> Result<bool> {
    let schema = registry.resolve(instance.schema())?;
    ensure_table_exists(session, registry, &schema)?;
    if instance.id().is_none() {
        return Ok(false);
    }
    let cursor = session.execute(&delete_sql(instance)?)?;
    Ok(cursor.changes() > 0)
}

/// Builds an instance from a `(rowid, fields...)` row, loading referenced
/// records with one lookup each.
pub(crate) fn decode(
    session: &Session<'_>,
    registry: &Registry,
    schema: &Arc<Schema>,
    row: &Row,
) -> Result<Instance> {
    let expected = schema.len() + 1;
    if row.len() != expected {
        return Err(Error::RowShape {
            table: schema.name().to_string(),
            expected,
            found: row.len(),
        });
    }

    let mut instance = Instance::new(schema);
    let id = match row.get(0) {
        Some(SqlValue::Integer(id)) => *id,
        other => {
            return Err(Error::type_mismatch(
                schema.name(),
                IDENTITY_COLUMN,
                "integer",
                other.map_or("nothing", SqlValue::kind),
            ))
        }
    };
    instance.set_id(Some(id));

    for (index, field) in schema.fields().enumerate() {
        let raw = row.values()[index + 1].clone();
        let value = match field.ty().reference_target() {
            Some(target) => {
                let target_id = raw.as_i64().ok_or_else(|| {
                    Error::type_mismatch(schema.name(), field.name(), "row id", raw.kind())
                })?;
                load_reference(session, registry, target, target_id)?.into()
            }
            None => field.ty().from_storage(schema.name(), field.name(), raw)?,
        };
        instance.insert_decoded(field.name(), value);
    }
    Ok(instance)
}

/// Second phase of reference loading: fetch the target row and decode it.
pub(crate) fn load_reference(
    session: &Session<'_>,
    registry: &Registry,
    target: &str,
    id: i64,
) -> Result<Instance> {
    let schema = registry.get(target)?;
    ensure_table_exists(session, registry, &schema)?;
    let mut cursor = session.execute(&select_by_id_sql(target, id))?;
    let row = cursor.fetch_one().ok_or_else(|| Error::DanglingReference {
        table: target.to_string(),
        id,
    })?;
    decode(session, registry, &schema, &row)
}
