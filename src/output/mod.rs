//! Output formatting for handler responses

mod json;
mod table;

use anyhow::Result;
use termcolor::{ColorChoice, StandardStream, WriteColor};

use crate::api::ApiResponse;
use crate::config::OutputFormat;

pub use json::JsonOutput;
pub use table::TableOutput;

/// Trait for output formatters
pub trait OutputFormatter {
    /// Render a response to a writer
    fn render(&self, response: &ApiResponse, writer: &mut dyn WriteColor) -> Result<()>;
}

/// Factory for creating output formatters
pub struct OutputFactory;

impl OutputFactory {
    /// Create an output formatter based on format type
    pub fn create(format: OutputFormat) -> Box<dyn OutputFormatter> {
        match format {
            OutputFormat::Table => Box::new(TableOutput::new()),
            OutputFormat::Json => Box::new(JsonOutput::new()),
        }
    }
}

/// Render a response to stdout, or to stderr when it is a failure
pub fn render_to_terminal(response: &ApiResponse, format: OutputFormat) -> Result<()> {
    let formatter = OutputFactory::create(format);
    let mut stream = if response.is_success() {
        StandardStream::stdout(ColorChoice::Auto)
    } else {
        StandardStream::stderr(ColorChoice::Auto)
    };
    formatter.render(response, &mut stream)
}
