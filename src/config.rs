//! Configuration handling for meddir

use std::path::PathBuf;

use crate::document::DEFAULT_COLUMN_WIDTH;

/// Default database file, relative to the working directory
pub const DEFAULT_DATABASE: &str = "meddir.db";

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "MEDDIR_LOG";

/// How command results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Aligned tables and colored status lines
    #[default]
    Table,
    /// Raw response bodies as JSON
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Runtime settings shared by every command
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file
    pub database: PathBuf,
    /// Directory reports are written to
    pub output_dir: PathBuf,
    /// Width of report columns without an override
    pub column_width: f64,
    /// Output format
    pub output_format: OutputFormat,
    /// Log filter directive, e.g. `info` or `meddir=debug`
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            output_dir: PathBuf::from("."),
            column_width: DEFAULT_COLUMN_WIDTH,
            output_format: OutputFormat::default(),
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Create a new Config for a database file
    pub fn new(database: PathBuf) -> Self {
        Self {
            database,
            ..Default::default()
        }
    }

    /// Set the report output directory
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Set the default report column width
    pub fn with_column_width(mut self, width: f64) -> Self {
        self.column_width = width;
        self
    }

    /// Set output format
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }
}
