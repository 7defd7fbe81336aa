use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised by the mapping layer.
///
/// Schema errors (`DuplicatePrimaryKey`, `MissingPrimaryKey`) surface at registration time
/// and are meant to abort startup. Everything else surfaces to the caller of the
/// persistence operation that hit it.
#[derive(Debug, Error)]
pub enum OrmError {
    #[error("Duplicate primary key for {model}: {field}")]
    DuplicatePrimaryKey { model: String, field: String },
    #[error("Primary key not found for {model}")]
    MissingPrimaryKey { model: String },
    #[error("Model is not registered: {0}")]
    UnregisteredModel(String),
    #[error("{model} has no value for field {field}")]
    MissingAttribute { model: String, field: String },
    #[error("{model} has no field named {field}")]
    UnknownField { model: String, field: String },
    #[error("Type mismatch for {field}: expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Column missing from result row: {0}")]
    MissingColumn(String),
    #[error("Unsupported column type for {0}")]
    UnsupportedColumn(String),
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),
    #[error("Statement has {expected} placeholders but {actual} arguments were given")]
    PlaceholderMismatch { expected: usize, actual: usize },
    #[error("{operation} affected {actual} rows, expected {expected}")]
    AffectedRows {
        operation: &'static str,
        expected: u64,
        actual: u64,
    },
    #[error("Timed out waiting for a pooled connection")]
    PoolTimeout,
    #[error("Database error: {0}")]
    Database(sqlx::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl OrmError {
    /// Whether this error is a definition-time configuration failure.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            OrmError::DuplicatePrimaryKey { .. }
                | OrmError::MissingPrimaryKey { .. }
                | OrmError::Config(_)
        )
    }
}

impl From<sqlx::Error> for OrmError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => OrmError::PoolTimeout,
            other => OrmError::Database(other),
        }
    }
}
