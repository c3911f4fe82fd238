//! Optimistic-concurrency updates
//!
//! An update is a conditional write scoped by record id and the version token
//! the caller last read. When the write touches no row, a single existence
//! check tells a vanished record apart from one that changed in between.
//! Conflicts are reported, never retried.

mod token;

use thiserror::Error;

use crate::model::WorkerFields;
use crate::store::StoreError;

pub use token::{TokenError, VersionToken};

/// Result of one versioned update call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The write matched the current version and was applied
    Applied,
    /// No record with this id exists
    RecordNotFound,
    /// The record exists but its version moved on since it was read
    VersionConflict,
}

impl std::fmt::Display for UpdateOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UpdateOutcome::Applied => write!(f, "applied"),
            UpdateOutcome::RecordNotFound => write!(f, "record not found"),
            UpdateOutcome::VersionConflict => write!(f, "version conflict"),
        }
    }
}

/// Reasons an update was rejected before or during the write
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Token(#[from] TokenError),

    /// The caller sent no version token; the store cannot compare against null
    #[error("a version token is required to update a record")]
    MissingVersion,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Storage port used by [`VersionedUpdateService`]
pub trait WorkerVersionStore: Send + Sync {
    /// Write `fields` only where both id and version match; returns rows affected
    fn update_if_current(
        &self,
        worker_id: i64,
        token: &VersionToken,
        fields: &WorkerFields,
    ) -> Result<usize, StoreError>;

    /// Read-only existence check
    fn worker_exists(&self, worker_id: i64) -> Result<bool, StoreError>;
}

/// Applies worker updates under optimistic concurrency
pub struct VersionedUpdateService<'a, S: WorkerVersionStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: WorkerVersionStore + ?Sized> VersionedUpdateService<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Decode a hex token and apply the update
    pub fn apply(
        &self,
        worker_id: i64,
        token_hex: &str,
        fields: &WorkerFields,
    ) -> Result<UpdateOutcome, UpdateError> {
        let token = VersionToken::parse(token_hex)?;
        self.update(worker_id, token.as_ref(), fields)
    }

    /// Conditional write, then an existence check only if nothing was written
    pub fn update(
        &self,
        worker_id: i64,
        token: Option<&VersionToken>,
        fields: &WorkerFields,
    ) -> Result<UpdateOutcome, UpdateError> {
        let token = token.ok_or(UpdateError::MissingVersion)?;

        let affected = self.store.update_if_current(worker_id, token, fields)?;
        let outcome = if affected > 0 {
            UpdateOutcome::Applied
        } else if self.store.worker_exists(worker_id)? {
            UpdateOutcome::VersionConflict
        } else {
            UpdateOutcome::RecordNotFound
        };

        tracing::debug!(worker_id, token = %token, %outcome, "versioned update");
        Ok(outcome)
    }
}

/// One-shot versioned update against `store`
pub fn apply_versioned_update<S: WorkerVersionStore + ?Sized>(
    store: &S,
    worker_id: i64,
    token_hex: &str,
    fields: &WorkerFields,
) -> Result<UpdateOutcome, UpdateError> {
    VersionedUpdateService::new(store).apply(worker_id, token_hex, fields)
}
