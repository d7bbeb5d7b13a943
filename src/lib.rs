//! Schema-first object mapping over SQLite.
//!
//! # Intention
//!
//! - Declare record types as ordered, typed field lists.
//! - Save, delete, and query instances without writing statement text.
//! - Resolve references between record types when rows are read back.
//!
//! # Architectural Boundaries
//!
//! - Statement execution belongs to the [`connector`]; everything else only
//!   produces statement text and interprets rows.
//! - No migrations, transactions across operations, or lazy loading.
//!
//! ```no_run
//! use rust_sqlite_orm::{ConnectorConfig, Database, Filter, Schema};
//!
//! # fn main() -> rust_sqlite_orm::Result<()> {
//! let db = Database::open(&ConnectorConfig::in_memory())?;
//! db.register(
//!     Schema::builder("Student")
//!         .integer("eid")
//!         .text("name")
//!         .float("gpa")
//!         .build()?,
//! )?;
//!
//! let mut silas = db
//!     .create("Student")?
//!     .with("eid", 3434)?
//!     .with("name", "Silas Strawn")?
//!     .with("gpa", 3.86)?;
//! db.save(&mut silas)?;
//!
//! let found = db.objects("Student", Filter::new().with_condition("eid", 3434))?;
//! assert_eq!(found.count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod connector;
pub mod database;
pub mod error;
pub mod field;
pub mod instance;
pub mod mapping;
pub mod query;
pub mod registry;
pub mod schema;
pub mod table;
pub mod value;

pub use connector::{Connector, ConnectorConfig, Cursor, Row};
pub use database::Database;
pub use error::{Error, Result};
pub use field::FieldType;
pub use instance::Instance;
pub use query::{Filter, QuerySet};
pub use registry::Registry;
pub use schema::{Field, Schema, SchemaBuilder, IDENTITY_COLUMN, RESERVED_PREFIX};
pub use value::{DataType, Literal, SqlValue, Value};
