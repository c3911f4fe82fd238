//! Store error taxonomy

use thiserror::Error;

use crate::model::TableError;

/// Errors raised by the directory store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The addressed record does not exist
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A foreign key or uniqueness rule blocked the statement
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A field value the store cannot keep in its declared form
    #[error("invalid {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// A payload exceeded the accepted size
    #[error("payload of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// A query produced rows that do not line up with its columns
    #[error(transparent)]
    Table(#[from] TableError),

    /// Any other failure of the underlying database
    #[error(transparent)]
    Database(rusqlite::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        StoreError::NotFound { entity, id }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref code, ref message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::ConstraintViolation(
                    message.clone().unwrap_or_else(|| code.to_string()),
                )
            }
            other => StoreError::Database(other),
        }
    }
}
