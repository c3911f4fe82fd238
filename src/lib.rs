//! meddir - Healthcare facility directory
//!
//! Keeps facilities, departments, specializations and medical workers in a
//! SQLite store, applies worker edits under optimistic concurrency with
//! version tokens, and exports the whole directory as a multi-sheet
//! spreadsheet.

pub mod api;
pub mod config;
pub mod document;
pub mod model;
pub mod output;
pub mod render;
pub mod report;
pub mod store;
pub mod update;

pub use config::Config;
pub use document::DocumentBuilder;
pub use model::ResultTable;
pub use render::CellRenderer;
pub use store::SqliteStore;
pub use update::{UpdateOutcome, VersionedUpdateService};
