//! Aligned tables and colored status lines

use std::io::Write;

use anyhow::Result;
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;
use termcolor::{Color, ColorSpec, WriteColor};

use crate::api::{ApiResponse, Body};

use super::OutputFormatter;

/// Human-oriented output: lists as tables, messages as status lines
pub struct TableOutput {
    success: ColorSpec,
    failure: ColorSpec,
}

impl TableOutput {
    pub fn new() -> Self {
        let mut success = ColorSpec::new();
        success.set_fg(Some(Color::Green)).set_bold(true);
        let mut failure = ColorSpec::new();
        failure.set_fg(Some(Color::Red)).set_bold(true);
        Self { success, failure }
    }

    fn write_status(&self, ok: bool, text: &str, writer: &mut dyn WriteColor) -> Result<()> {
        let (spec, label) = if ok {
            (&self.success, "ok")
        } else {
            (&self.failure, "error")
        };
        writer.set_color(spec)?;
        write!(writer, "{label}:")?;
        writer.reset()?;
        writeln!(writer, " {text}")?;
        Ok(())
    }

    fn write_json(&self, ok: bool, value: &Value, writer: &mut dyn WriteColor) -> Result<()> {
        match value {
            Value::Array(items) if items.is_empty() => {
                writeln!(writer, "No records.")?;
            }
            Value::Array(items) => {
                writeln!(writer, "{}", records_table(items))?;
                writeln!(writer, "{} record(s)", items.len())?;
            }
            Value::Object(fields) => match fields.get("message").and_then(Value::as_str) {
                Some(message) => {
                    let text = match fields.get("error").and_then(Value::as_str) {
                        Some(code) => format!("{code}: {message}"),
                        None => message.to_string(),
                    };
                    self.write_status(ok, &text, writer)?;
                    for (key, value) in fields {
                        if key != "message" && key != "error" {
                            writeln!(writer, "  {key}: {}", cell_text(value))?;
                        }
                    }
                }
                None => writeln!(writer, "{}", record_table(fields))?,
            },
            other => writeln!(writer, "{}", cell_text(other))?,
        }
        Ok(())
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn render(&self, response: &ApiResponse, writer: &mut dyn WriteColor) -> Result<()> {
        let ok = response.is_success();
        match &response.body {
            Body::Json(value) => self.write_json(ok, value, writer)?,
            Body::Text(text) => self.write_status(ok, text, writer)?,
            Body::Binary {
                content_type,
                filename,
                data,
            } => {
                let name = filename.as_deref().unwrap_or("payload");
                self.write_status(ok, &format!("{name} ({content_type}, {} bytes)", data.len()), writer)?;
            }
            Body::Empty => writeln!(writer, "No content.")?,
        }
        Ok(())
    }
}

/// One row per record, columns taken from the first record
fn records_table(items: &[Value]) -> String {
    let headers: Vec<String> = match items.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => vec!["value".to_string()],
    };

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in items {
        let row: Vec<String> = match item {
            Value::Object(fields) => headers
                .iter()
                .map(|h| fields.get(h).map(cell_text).unwrap_or_default())
                .collect(),
            other => vec![cell_text(other)],
        };
        builder.push_record(row);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

/// Field/value pairs of a single record
fn record_table(fields: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["field".to_string(), "value".to_string()]);
    for (key, value) in fields {
        builder.push_record([key.clone(), cell_text(value)]);
    }

    let mut table = builder.build();
    table.with(Style::modern());
    table.to_string()
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use termcolor::NoColor;

    use super::*;

    fn render(response: &ApiResponse) -> String {
        let mut writer = NoColor::new(Vec::new());
        TableOutput::new().render(response, &mut writer).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_list_renders_as_table() {
        let response = ApiResponse {
            status: 200,
            body: Body::Json(json!([
                {"worker_id": 1, "last_name": "Nguyen", "department_head": null},
                {"worker_id": 2, "last_name": "Keller", "department_head": "Dr. Park"},
            ])),
        };
        let out = render(&response);

        assert!(out.contains("worker_id"));
        assert!(out.contains("Nguyen"));
        assert!(out.contains("Dr. Park"));
        assert!(out.contains("2 record(s)"));
    }

    #[test]
    fn test_conflict_renders_code_and_message() {
        let response = ApiResponse {
            status: 409,
            body: Body::Json(json!({"error": "CONCURRENCY_CONFLICT", "message": "reload"})),
        };
        assert_eq!(render(&response), "error: CONCURRENCY_CONFLICT: reload\n");
    }

    #[test]
    fn test_message_with_extra_fields() {
        let response = ApiResponse {
            status: 200,
            body: Body::Json(json!({"message": "Medical worker added successfully", "worker_id": 6})),
        };
        let out = render(&response);
        assert!(out.starts_with("ok: Medical worker added successfully\n"));
        assert!(out.contains("worker_id: 6"));
    }

    #[test]
    fn test_text_and_empty_bodies() {
        let not_found = ApiResponse {
            status: 404,
            body: Body::Text("Worker not found".into()),
        };
        assert_eq!(render(&not_found), "error: Worker not found\n");

        let empty = ApiResponse {
            status: 204,
            body: Body::Empty,
        };
        assert_eq!(render(&empty), "No content.\n");
    }
}
