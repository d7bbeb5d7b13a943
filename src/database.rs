//! Entry point tying the connection to the registered record types.

use std::sync::Arc;

use tracing::debug;

use crate::connector::{Connector, ConnectorConfig, Cursor, Row};
use crate::error::Result;
use crate::instance::Instance;
use crate::mapping;
use crate::query::{select_sql, Filter, QuerySet};
use crate::registry::Registry;
use crate::schema::Schema;
use crate::table;

/// A connection plus the record types mapped onto it.
///
/// Every operation holds the connection lock for its whole statement
/// sequence, so an existence probe and the `CREATE TABLE` that follows it
/// cannot interleave with another caller in this process.
#[derive(Debug, Default)]
pub struct Database {
    connector: Connector,
    registry: Registry,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            connector: Connector::new(),
            registry,
        }
    }

    /// Opens a database described by `config` and returns it connected.
    pub fn open(config: &ConnectorConfig) -> Result<Self> {
        let db = Self::new();
        db.connect(config)?;
        Ok(db)
    }

    pub fn connect(&self, config: &ConnectorConfig) -> Result<()> {
        self.connector.connect(config)
    }

    pub fn disconnect(&self) -> Result<()> {
        self.connector.disconnect()
    }

    pub fn is_connected(&self) -> bool {
        self.connector.is_connected()
    }

    pub fn connector(&self) -> &Connector {
        &self.connector
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn register(&self, schema: Arc<Schema>) -> Result<Arc<Schema>> {
        self.registry.register(Arc::clone(&schema))?;
        Ok(schema)
    }

    pub fn schema(&self, name: &str) -> Result<Arc<Schema>> {
        self.registry.get(name)
    }

    /// Fresh, unsaved instance of a registered record type.
    pub fn create(&self, name: &str) -> Result<Instance> {
        Ok(Instance::new(&self.registry.get(name)?))
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let schema = self.registry.get(name)?;
        let session = self.connector.session()?;
        table::table_exists(&session, &schema)
    }

    pub fn ensure_table(&self, name: &str) -> Result<()> {
        let schema = self.registry.get(name)?;
        let session = self.connector.session()?;
        table::ensure_table_exists(&session, &self.registry, &schema)
    }

    /// Inserts `instance`, or rewrites its row if it already has an identity.
    pub fn save(&self, instance: &mut Instance) -> Result<()> {
        let session = self.connector.session()?;
        mapping::save(&session, &self.registry, instance)
    }

    /// Deletes the row behind `instance`; returns whether one was removed.
    pub fn delete(&self, instance: &Instance) -> Result<bool> {
        let session = self.connector.session()?;
        mapping::delete(&session, &self.registry, instance)
    }

    /// Runs an equality query and snapshots the matching rows.
    pub fn objects(&self, name: &str, filter: Filter) -> Result<QuerySet<'_>> {
        let schema = self.registry.get(name)?;
        for (_, value) in filter.conditions() {
            if let Some(target) = value.as_reference() {
                self.registry.resolve(target.schema())?;
            }
        }
        let sql = select_sql(&schema, &filter)?;
        let session = self.connector.session()?;
        table::ensure_table_exists(&session, &self.registry, &schema)?;
        let rows = session.execute(&sql)?.fetch_all();
        debug!(table = %schema.name(), rows = rows.len(), "query");
        Ok(QuerySet::new(self, schema, rows))
    }

    /// Every stored record of `name`.
    pub fn all(&self, name: &str) -> Result<QuerySet<'_>> {
        self.objects(name, Filter::new())
    }

    /// Runs raw statement text on the connection.
    pub fn execute(&self, sql: &str) -> Result<Cursor> {
        self.connector.execute(sql)
    }

    pub(crate) fn decode(&self, schema: &Arc<Schema>, row: &Row) -> Result<Instance> {
        let session = self.connector.session()?;
        mapping::decode(&session, &self.registry, schema, row)
    }
}
