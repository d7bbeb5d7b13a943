//! Backing-table lifecycle: existence probe and on-demand creation.

use tracing::info;

use crate::connector::Session;
use crate::error::{Error, Result};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::value::SqlValue;

pub fn exists_sql(name: &str) -> String {
    format!(
        "SELECT count(name) FROM sqlite_master WHERE type='table' AND name='{}'",
        name
    )
}

/// `CREATE TABLE` with every column first, then the reference constraints.
///
/// The engine supplies the `rowid` identity column itself.
pub fn create_table_sql(schema: &Schema) -> String {
    let columns = schema
        .fields()
        .map(|f| f.ty().column_declaration(f.name()));
    let constraints = schema
        .fields()
        .filter_map(|f| f.ty().post_declaration_constraint(f.name()));
    let parts: Vec<String> = columns.chain(constraints).collect();
    format!("CREATE TABLE {} ({})", schema.name(), parts.join(", "))
}

pub(crate) fn table_exists(session: &Session<'_>, schema: &Schema) -> Result<bool> {
    let mut cursor = session.execute(&exists_sql(schema.name()))?;
    let count = cursor
        .fetch_one()
        .and_then(|row| row.get(0).and_then(SqlValue::as_i64))
        .unwrap_or(0);
    Ok(count == 1)
}

/// Creates the table for `schema`, and first the tables of every record
/// type it references. Reference cycles fail with [`Error::CyclicSchema`].
pub(crate) fn ensure_table_exists(
    session: &Session<'_>,
    registry: &Registry,
    schema: &Schema,
) -> Result<()> {
    let mut in_progress = Vec::new();
    ensure(session, registry, schema, &mut in_progress)
}

fn ensure(
    session: &Session<'_>,
    registry: &Registry,
    schema: &Schema,
    in_progress: &mut Vec<String>,
) -> Result<()> {
    if in_progress.iter().any(|name| name == schema.name()) {
        let mut path = in_progress.clone();
        path.push(schema.name().to_string());
        return Err(Error::CyclicSchema { path });
    }
    if table_exists(session, schema)? {
        return Ok(());
    }

    in_progress.push(schema.name().to_string());
    for target in schema.references() {
        let target = registry.get(target)?;
        ensure(session, registry, &target, in_progress)?;
    }
    in_progress.pop();

    session.execute(&create_table_sql(schema))?;
    info!(table = %schema.name(), "created table");
    Ok(())
}
