//! Error types for simtrack

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Simtrack error types
#[derive(Error, Debug)]
pub enum Error {
    /// Process identity unavailable (no launcher rank in the environment)
    #[error("Process identity unavailable: {0}\nResult recording is disabled for this process")]
    UnsupportedEnvironment(String),

    /// Experiment name failed validation
    #[error("Invalid experiment name: {0}\nNames must be non-empty and are used as both file stem and table name")]
    InvalidName(String),

    /// Row columns do not match the table already on disk
    #[error("Schema mismatch for table '{table}': file has columns [{existing}], row has [{incoming}]")]
    SchemaMismatch {
        /// Table the append targeted
        table: String,
        /// Column layout already persisted
        existing: String,
        /// Column layout of the rejected row
        incoming: String,
    },

    /// Target file belongs to a different table
    #[error("Table mismatch: file stores table '{found}', append targeted '{expected}'")]
    TableMismatch {
        /// Table name the append targeted
        expected: String,
        /// Table name recorded in the file
        found: String,
    },

    /// Row construction failed (malformed field values)
    #[error("Row error: {0}")]
    RowError(String),

    /// Storage error (Parquet/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Visualization controller was already initialized
    #[error("Visualization already initialized\nCall shutdown() before re-initializing with a new frame")]
    AlreadyInitialized,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}
