//! Error types shared by every mapping operation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────────
    // Connection
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("no active database connection")]
    NotConnected,

    #[error("a database connection is already open")]
    AlreadyConnected,

    #[error("lock poisoned by a panicking holder")]
    LockPoisoned,

    // ─────────────────────────────────────────────────────────────────────────────
    // Schema declaration
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("invalid identifier: '{name}'")]
    InvalidIdentifier { name: String },

    #[error("record type '{name}' declares no fields")]
    EmptySchema { name: String },

    #[error("duplicate field '{field}' on record type '{table}'")]
    DuplicateField { table: String, field: String },

    #[error("record type '{name}' is already registered")]
    DuplicateRecordType { name: String },

    #[error("unknown record type: '{name}'")]
    UnknownRecordType { name: String },

    #[error("record type '{name}' differs from its registered declaration")]
    SchemaMismatch { name: String },

    #[error("cyclic schema: {}", path.join(" -> "))]
    CyclicSchema { path: Vec<String> },

    // ─────────────────────────────────────────────────────────────────────────────
    // Values and conversions
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("record type '{table}' has no field '{field}'")]
    UnknownField { table: String, field: String },

    #[error("field '{table}.{field}' expects {expected}, got {found}")]
    TypeMismatch {
        table: String,
        field: String,
        expected: String,
        found: String,
    },

    #[error("field '{table}.{field}' has no value")]
    MissingValue { table: String, field: String },

    #[error("field '{table}.{field}' references a record that has not been saved")]
    UnpersistedReference { table: String, field: String },

    #[error("field '{field}' cannot store a non-finite float")]
    NonFiniteFloat { field: String },

    #[error("field '{field}' does not support {operation}")]
    Unsupported { field: String, operation: String },

    // ─────────────────────────────────────────────────────────────────────────────
    // Rows and result sets
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("row of '{table}' has {found} columns, expected {expected}")]
    RowShape {
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("reference to '{table}' row {id} does not resolve")]
    DanglingReference { table: String, id: i64 },

    #[error("index {index} out of bounds for result set of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    // ─────────────────────────────────────────────────────────────────────────────
    // Storage engine
    // ─────────────────────────────────────────────────────────────────────────────
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

impl Error {
    pub(crate) fn type_mismatch(
        table: &str,
        field: &str,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Error::TypeMismatch {
            table: table.to_string(),
            field: field.to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// True for failures raised by the storage engine itself rather than the mapper.
    pub fn is_storage(&self) -> bool {
        matches!(self, Error::Sqlite(_))
    }
}
