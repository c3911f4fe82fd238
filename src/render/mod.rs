//! Cell-level display decisions
//!
//! Turns one native value, plus the column's declared type and name, into a
//! [`RenderedCell`]. Rendering is total: every value maps to exactly one of
//! the six cell kinds and nothing here can fail.

mod cell;

use chrono::NaiveTime;

use crate::model::{NativeValue, TypeFamily};

pub use cell::{CellKind, FormatHint, RenderedCell};

/// Column names that carry special rendering rules
#[derive(Debug, Clone)]
pub struct ColumnRules {
    /// Columns holding a version stamp (hex encoded)
    pub version_columns: Vec<String>,
    /// Columns holding opaque payloads such as images (summarised)
    pub payload_columns: Vec<String>,
    /// Substring marking a monetary column
    pub currency_marker: String,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            version_columns: vec!["row_version".to_string()],
            payload_columns: vec!["image_data".to_string()],
            currency_marker: "salary".to_string(),
        }
    }
}

impl ColumnRules {
    fn is_version_column(&self, name: &str) -> bool {
        self.version_columns.iter().any(|c| c.eq_ignore_ascii_case(name))
    }

    fn is_payload_column(&self, name: &str) -> bool {
        self.payload_columns.iter().any(|c| c.eq_ignore_ascii_case(name))
    }

    fn is_currency_column(&self, name: &str) -> bool {
        !self.currency_marker.is_empty()
            && name
                .to_ascii_lowercase()
                .contains(&self.currency_marker.to_ascii_lowercase())
    }
}

/// Cell renderer with configurable column rules
#[derive(Debug, Clone, Default)]
pub struct CellRenderer {
    rules: ColumnRules,
}

impl CellRenderer {
    /// Create a renderer with custom column rules
    pub fn new(rules: ColumnRules) -> Self {
        Self { rules }
    }

    /// Decide how one value is displayed
    pub fn render(&self, value: &NativeValue, source_type: &str, column_name: &str) -> RenderedCell {
        match value {
            NativeValue::Null => RenderedCell::empty(),
            NativeValue::Bytes(bytes) => self.render_bytes(bytes, source_type, column_name),
            NativeValue::Int(i) => RenderedCell::integer(*i),
            NativeValue::Float(f) => {
                if self.rules.is_currency_column(column_name) {
                    RenderedCell::real(*f).with_hint(FormatHint::Currency)
                } else {
                    RenderedCell::real(*f)
                }
            }
            NativeValue::Bool(b) => RenderedCell::boolean(*b),
            NativeValue::String(s) => RenderedCell::text(s.clone()),
            NativeValue::DateTime(dt) => RenderedCell::timestamp(*dt),
            NativeValue::Date(d) => RenderedCell::timestamp(d.and_time(NaiveTime::default())),
            // Anything without a dedicated cell kind is stringified
            NativeValue::Time(t) => RenderedCell::text(t.to_string()),
        }
    }

    fn render_bytes(&self, bytes: &[u8], source_type: &str, column_name: &str) -> RenderedCell {
        let binary = TypeFamily::classify(source_type).is_binary();

        if binary && bytes.is_empty() {
            return RenderedCell::text(String::new());
        }

        if binary && self.rules.is_version_column(column_name) {
            RenderedCell::text(hex::encode(bytes))
        } else if self.rules.is_payload_column(column_name) && !bytes.is_empty() {
            RenderedCell::text(format!("[Binary Data: {} bytes]", bytes.len()))
        } else if binary {
            RenderedCell::text(hex::encode(bytes))
        } else {
            // Some drivers hand textual columns back as byte buffers
            RenderedCell::text(String::from_utf8_lossy(bytes).into_owned())
        }
    }
}

/// Render with the default column rules
pub fn render(value: &NativeValue, source_type: &str, column_name: &str) -> RenderedCell {
    CellRenderer::default().render(value, source_type, column_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn all_kinds() -> Vec<NativeValue> {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        vec![
            NativeValue::Null,
            NativeValue::Bool(true),
            NativeValue::Int(-7),
            NativeValue::Float(f64::NAN),
            NativeValue::String("x".into()),
            NativeValue::Bytes(vec![]),
            NativeValue::Bytes(vec![0xde, 0xad]),
            NativeValue::Date(date),
            NativeValue::DateTime(date.and_hms_opt(8, 30, 0).unwrap()),
            NativeValue::Time(NaiveTime::from_hms_opt(8, 30, 0).unwrap()),
        ]
    }

    #[test]
    fn test_null_is_empty_for_every_source_type() {
        for source_type in ["", "VARBINARY(8)", "DECIMAL(10,2)", "INT", "DATETIME"] {
            for column in ["row_version", "image_data", "salary", "name"] {
                let cell = render(&NativeValue::Null, source_type, column);
                assert_eq!(cell, RenderedCell::empty());
                assert_eq!(cell.hint, None);
            }
        }
    }

    #[test]
    fn test_every_value_renders_to_one_kind() {
        for value in all_kinds() {
            for source_type in ["", "BLOB", "TEXT", "GEOGRAPHY"] {
                // Terminates without panicking for every combination
                let _ = render(&value, source_type, "anything").kind();
            }
        }
    }

    #[test]
    fn test_version_column_is_lowercase_hex() {
        let bytes = vec![0x00, 0xAB, 0x10, 0xFF];
        let cell = render(&NativeValue::Bytes(bytes.clone()), "ROWVERSION", "row_version");

        assert_eq!(cell, RenderedCell::text("00ab10ff".to_string()));
        let CellKind::Text(text) = &cell.kind else {
            panic!("expected text");
        };
        assert!(!text.starts_with("0x"));
        assert_eq!(hex::decode(text).unwrap(), bytes);
    }

    #[test]
    fn test_payload_column_is_summarised() {
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        let cell = render(&NativeValue::Bytes(bytes), "VARBINARY(MAX)", "image_data");
        assert_eq!(cell, RenderedCell::text("[Binary Data: 5 bytes]".to_string()));

        // Summarised even when the declared type is not binary
        let cell = render(&NativeValue::Bytes(vec![1, 2, 3]), "", "image_data");
        assert_eq!(cell, RenderedCell::text("[Binary Data: 3 bytes]".to_string()));
    }

    #[test]
    fn test_other_binary_columns_fall_back_to_hex() {
        let cell = render(&NativeValue::Bytes(vec![0x0A, 0x0B]), "BINARY(2)", "checksum");
        assert_eq!(cell, RenderedCell::text("0a0b".to_string()));
    }

    #[test]
    fn test_non_binary_bytes_decode_as_text() {
        let cell = render(&NativeValue::Bytes(b"75000.50".to_vec()), "DECIMAL", "salary");
        assert_eq!(cell, RenderedCell::text("75000.50".to_string()));
    }

    #[test]
    fn test_empty_binary_is_empty_text() {
        let cell = render(&NativeValue::Bytes(vec![]), "VARBINARY(MAX)", "image_data");
        assert_eq!(cell, RenderedCell::text(String::new()));
    }

    #[test]
    fn test_currency_hint_follows_column_name() {
        let salary = render(&NativeValue::Float(75000.50), "DECIMAL(10,2)", "salary");
        assert_eq!(salary.kind, CellKind::Real(75000.50));
        assert_eq!(salary.hint, Some(FormatHint::Currency));

        let upper = render(&NativeValue::Float(1.0), "", "Avg_SALARY");
        assert_eq!(upper.hint, Some(FormatHint::Currency));

        let count = render(&NativeValue::Float(75000.50), "DECIMAL(10,2)", "bonus_count");
        assert_eq!(count.kind, CellKind::Real(75000.50));
        assert_eq!(count.hint, None);
    }

    #[test]
    fn test_scalar_kinds() {
        assert_eq!(render(&NativeValue::Int(42), "INT", "id").kind, CellKind::Integer(42));
        assert_eq!(render(&NativeValue::Bool(false), "BIT", "flag").kind, CellKind::Boolean(false));
        assert_eq!(
            render(&NativeValue::String("Cardiology".into()), "TEXT", "name").kind,
            CellKind::Text("Cardiology".into())
        );

        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        assert_eq!(
            render(&NativeValue::Date(date), "DATE", "hire_date").kind,
            CellKind::Timestamp(date.and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_unclassified_values_are_stringified() {
        let time = NaiveTime::from_hms_opt(14, 5, 0).unwrap();
        let cell = render(&NativeValue::Time(time), "TIME", "shift_start");
        assert_eq!(cell, RenderedCell::text("14:05:00".to_string()));
    }

    #[test]
    fn test_custom_rules() {
        let renderer = CellRenderer::new(ColumnRules {
            version_columns: vec!["etag".into()],
            payload_columns: vec!["scan".into()],
            currency_marker: "amount".into(),
        });

        let etag = renderer.render(&NativeValue::Bytes(vec![1]), "BINARY(1)", "ETag");
        assert_eq!(etag, RenderedCell::text("01".to_string()));

        let amount = renderer.render(&NativeValue::Float(2.5), "", "paid_amount");
        assert_eq!(amount.hint, Some(FormatHint::Currency));
    }
}
