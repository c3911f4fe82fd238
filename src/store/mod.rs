//! Persistence layer for the directory

mod decode;
mod error;
mod sqlite;

pub use error::StoreError;
pub use sqlite::SqliteStore;

/// Largest accepted worker image (5 MiB)
pub const MAX_IMAGE_BYTES: usize = 5 << 20;
