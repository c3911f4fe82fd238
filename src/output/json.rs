//! JSON output format

use std::io::Write;

use anyhow::Result;
use serde_json::{json, Value};
use termcolor::WriteColor;

use crate::api::{ApiResponse, Body};

use super::OutputFormatter;

/// Prints response bodies as JSON documents
pub struct JsonOutput {
    pretty: bool,
}

impl JsonOutput {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn document(response: &ApiResponse) -> Value {
        match &response.body {
            Body::Json(value) => value.clone(),
            Body::Text(text) => json!({ "status": response.status, "message": text }),
            Body::Binary {
                content_type,
                filename,
                data,
            } => json!({
                "status": response.status,
                "content_type": content_type,
                "filename": filename,
                "bytes": data.len(),
            }),
            Body::Empty => json!({ "status": response.status }),
        }
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn render(&self, response: &ApiResponse, writer: &mut dyn WriteColor) -> Result<()> {
        let document = Self::document(response);
        let text = if self.pretty {
            serde_json::to_string_pretty(&document)?
        } else {
            serde_json::to_string(&document)?
        };
        writeln!(writer, "{}", text)?;
        Ok(())
    }
}
