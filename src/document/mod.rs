//! Spreadsheet document assembly
//!
//! Every [`ResultTable`] becomes one sheet: a shaded, bold header row with the
//! column names, then one row per result row with each value passed through
//! the [`CellRenderer`]. Sheets are built as standalone worksheets and only
//! attached to the workbook once complete, so a sheet that fails halfway
//! leaves nothing behind and its siblings still render.

mod layout;

use std::borrow::Borrow;

use rust_xlsxwriter::{ColNum, Color, Format, RowNum, Workbook, Worksheet, XlsxError};
use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::model::ResultTable;
use crate::render::{CellKind, CellRenderer, FormatHint, RenderedCell};

pub use layout::{ColumnLayout, DEFAULT_COLUMN_WIDTH};

/// MIME type of the produced document
pub const CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const HEADER_FILL: u32 = 0xE0E0E0;
const TIMESTAMP_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Largest magnitude a spreadsheet number holds without rounding
const MAX_EXACT_INTEGER: i64 = 1 << 53;

/// Errors raised while producing a document or one of its sheets
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error(transparent)]
    Xlsx(#[from] XlsxError),

    #[error("sheet '{0}' exceeds the spreadsheet row or column limit")]
    TooLarge(String),

    #[error("sheet name '{0}' is already used")]
    DuplicateSheet(String),
}

/// A finished document and a summary of what went into it
#[derive(Debug)]
pub struct Document {
    pub bytes: Vec<u8>,
    /// Sheets written, in order
    pub sheets: Vec<String>,
    /// Sections that could not be rendered and were left out
    pub skipped: Vec<String>,
}

impl Document {
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builds multi-sheet spreadsheet documents from result tables
pub struct DocumentBuilder {
    renderer: CellRenderer,
    layout: ColumnLayout,
    header_format: Format,
    timestamp_format: Format,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(CellRenderer::default(), ColumnLayout::default())
    }
}

impl DocumentBuilder {
    pub fn new(renderer: CellRenderer, layout: ColumnLayout) -> Self {
        Self {
            renderer,
            layout,
            header_format: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(HEADER_FILL)),
            timestamp_format: Format::new().set_num_format(TIMESTAMP_FORMAT),
        }
    }

    /// Build a document from tables that are all available
    pub fn build(&self, tables: &[ResultTable]) -> Result<Document, DocumentError> {
        self.build_sections(tables.iter().map(Ok::<_, std::convert::Infallible>))
    }

    /// Build a document from sections that may have failed upstream
    ///
    /// A failed section, or one that cannot be rendered, is logged and left
    /// out; only a failure to serialize the workbook itself is an error.
    pub fn build_sections<T, E, I>(&self, sections: I) -> Result<Document, DocumentError>
    where
        I: IntoIterator<Item = Result<T, E>>,
        T: Borrow<ResultTable>,
        E: std::fmt::Display,
    {
        let mut workbook = Workbook::new();
        let mut sheets = Vec::new();
        let mut skipped = Vec::new();
        let mut used_names: FxHashSet<String> = FxHashSet::default();

        for (position, section) in sections.into_iter().enumerate() {
            let table = match section {
                Ok(table) => table,
                Err(err) => {
                    tracing::warn!(section = position, error = %err, "skipping section: source failed");
                    skipped.push(format!("section {}", position + 1));
                    continue;
                }
            };
            let table: &ResultTable = table.borrow();

            match self.render_sheet(table, &used_names) {
                Ok(sheet) => {
                    used_names.insert(table.name.to_lowercase());
                    sheets.push(table.name.clone());
                    workbook.push_worksheet(sheet);
                }
                Err(err) => {
                    tracing::warn!(sheet = %table.name, error = %err, "skipping sheet: render failed");
                    skipped.push(table.name.clone());
                }
            }
        }

        if sheets.is_empty() {
            // A workbook needs at least one sheet to be valid
            let mut blank = Worksheet::new();
            blank.set_name("Sheet1")?;
            workbook.push_worksheet(blank);
        }

        let bytes = workbook.save_to_buffer()?;
        tracing::debug!(sheets = sheets.len(), skipped = skipped.len(), bytes = bytes.len(), "document built");

        Ok(Document {
            bytes,
            sheets,
            skipped,
        })
    }

    fn render_sheet(
        &self,
        table: &ResultTable,
        used_names: &FxHashSet<String>,
    ) -> Result<Worksheet, DocumentError> {
        if used_names.contains(&table.name.to_lowercase()) {
            return Err(DocumentError::DuplicateSheet(table.name.clone()));
        }

        let mut sheet = Worksheet::new();
        sheet.set_name(&table.name)?;

        for (index, column) in table.columns.iter().enumerate() {
            let col = column_number(table, index)?;
            sheet.write_string_with_format(0, col, &column.name, &self.header_format)?;
        }

        for (index, values) in table.rows().iter().enumerate() {
            let row = row_number(table, index + 1)?;
            for (col_index, (value, column)) in values.iter().zip(&table.columns).enumerate() {
                let cell = self.renderer.render(value, &column.source_type, &column.name);
                self.write_cell(&mut sheet, row, column_number(table, col_index)?, &cell)?;
            }
        }

        for (index, width) in self
            .layout
            .widths_for(&table.name, table.column_count())
            .into_iter()
            .enumerate()
        {
            sheet.set_column_width(column_number(table, index)?, width)?;
        }

        Ok(sheet)
    }

    fn write_cell(
        &self,
        sheet: &mut Worksheet,
        row: RowNum,
        col: ColNum,
        cell: &RenderedCell,
    ) -> Result<(), DocumentError> {
        match &cell.kind {
            CellKind::Empty => {}
            CellKind::Text(text) => {
                sheet.write_string(row, col, text)?;
            }
            CellKind::Integer(i) if i.unsigned_abs() > MAX_EXACT_INTEGER as u64 => {
                sheet.write_string(row, col, i.to_string())?;
            }
            CellKind::Integer(i) => {
                sheet.write_number(row, col, *i as f64)?;
            }
            // Spreadsheets have no NaN or infinity
            CellKind::Real(f) if !f.is_finite() => {
                sheet.write_string(row, col, f.to_string())?;
            }
            CellKind::Real(f) => match cell.hint {
                Some(hint) => {
                    sheet.write_number_with_format(row, col, *f, &hint_format(hint))?;
                }
                None => {
                    sheet.write_number(row, col, *f)?;
                }
            },
            CellKind::Boolean(b) => {
                sheet.write_boolean(row, col, *b)?;
            }
            CellKind::Timestamp(dt) => {
                sheet.write_datetime_with_format(row, col, dt, &self.timestamp_format)?;
            }
        }
        Ok(())
    }
}

/// Build a document with the default renderer and layout, returning its bytes
pub fn render_document(tables: &[ResultTable]) -> Result<Vec<u8>, DocumentError> {
    DocumentBuilder::default().build(tables).map(Document::into_bytes)
}

fn hint_format(hint: FormatHint) -> Format {
    Format::new().set_num_format(hint.number_format())
}

fn column_number(table: &ResultTable, index: usize) -> Result<ColNum, DocumentError> {
    ColNum::try_from(index).map_err(|_| DocumentError::TooLarge(table.name.clone()))
}

fn row_number(table: &ResultTable, index: usize) -> Result<RowNum, DocumentError> {
    RowNum::try_from(index).map_err(|_| DocumentError::TooLarge(table.name.clone()))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use chrono::NaiveDate;

    use super::*;
    use crate::model::{Column, NativeValue};

    fn open(bytes: &[u8]) -> Xlsx<Cursor<Vec<u8>>> {
        open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap()
    }

    fn workers() -> ResultTable {
        let mut table = ResultTable::new(
            "Medical Workers",
            vec![
                Column::with_type("worker_id", 0, "INT"),
                Column::with_type("first_name", 1, "NVARCHAR(50)"),
                Column::with_type("salary", 2, "DECIMAL(10,2)"),
                Column::with_type("image_data", 3, "VARBINARY(MAX)"),
                Column::with_type("row_version", 4, "ROWVERSION"),
                Column::with_type("active", 5, "BIT"),
                Column::with_type("created_date", 6, "DATETIME"),
            ],
        );
        let created = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        table
            .add_row(vec![
                NativeValue::Int(1),
                NativeValue::String("Alice".into()),
                NativeValue::Float(75000.5),
                NativeValue::Bytes(vec![0xFF; 10]),
                NativeValue::Bytes(vec![0, 0, 0, 0, 0, 0, 0x07, 0xD1]),
                NativeValue::Bool(true),
                NativeValue::DateTime(created),
            ])
            .unwrap();
        table
            .add_row(vec![
                NativeValue::Int(2),
                NativeValue::Null,
                NativeValue::Null,
                NativeValue::Null,
                NativeValue::Bytes(vec![0xAB]),
                NativeValue::Bool(false),
                NativeValue::Null,
            ])
            .unwrap();
        table
    }

    fn single(name: &str) -> ResultTable {
        let mut table = ResultTable::new(name, vec![Column::with_type("id", 0, "INT")]);
        table.add_row(vec![NativeValue::Int(7)]).unwrap();
        table
    }

    #[test]
    fn test_sheet_contents() {
        let document = DocumentBuilder::default().build(&[workers()]).unwrap();
        assert_eq!(document.sheets, ["Medical Workers"]);

        let mut workbook = open(&document.bytes);
        let range = workbook.worksheet_range("Medical Workers").unwrap();

        assert_eq!(range.get_value((0, 0)), Some(&Data::String("worker_id".into())));
        assert_eq!(range.get_value((0, 4)), Some(&Data::String("row_version".into())));
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(1.0)));
        assert_eq!(range.get_value((1, 1)), Some(&Data::String("Alice".into())));
        assert_eq!(range.get_value((1, 2)), Some(&Data::Float(75000.5)));
        assert_eq!(
            range.get_value((1, 3)),
            Some(&Data::String("[Binary Data: 10 bytes]".into()))
        );
        assert_eq!(
            range.get_value((1, 4)),
            Some(&Data::String("00000000000007d1".into()))
        );
        assert_eq!(range.get_value((1, 5)), Some(&Data::Bool(true)));
        assert!(matches!(range.get_value((1, 6)), Some(Data::DateTime(_))));
        assert_eq!(range.get_value((2, 4)), Some(&Data::String("ab".into())));
    }

    #[test]
    fn test_nulls_stay_blank() {
        let document = DocumentBuilder::default().build(&[workers()]).unwrap();
        let mut workbook = open(&document.bytes);
        let range = workbook.worksheet_range("Medical Workers").unwrap();

        for col in [1, 2, 3, 6] {
            assert!(matches!(range.get_value((2, col)), None | Some(Data::Empty)));
        }
    }

    #[test]
    fn test_sheet_order_is_preserved() {
        let tables = [single("Zeta"), single("Alpha"), single("Mid")];
        let document = DocumentBuilder::default().build(&tables).unwrap();

        assert_eq!(open(&document.bytes).sheet_names(), ["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_failed_section_is_skipped() {
        let sections: Vec<Result<ResultTable, String>> = vec![
            Ok(single("First")),
            Err("query failed".to_string()),
            Ok(single("Third")),
        ];
        let document = DocumentBuilder::default().build_sections(sections).unwrap();

        assert_eq!(document.sheets, ["First", "Third"]);
        assert_eq!(document.skipped.len(), 1);
        assert_eq!(open(&document.bytes).sheet_names(), ["First", "Third"]);
    }

    #[test]
    fn test_unrenderable_sheet_does_not_affect_siblings() {
        let tables = [single("Before"), single("Bad/Name"), single("After"), single("before")];
        let document = DocumentBuilder::default().build(&tables).unwrap();

        assert_eq!(document.sheets, ["Before", "After"]);
        assert_eq!(document.skipped, ["Bad/Name", "before"]);

        let mut workbook = open(&document.bytes);
        let range = workbook.worksheet_range("After").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::Float(7.0)));
    }

    #[test]
    fn test_empty_input_is_a_valid_document() {
        let document = DocumentBuilder::default().build(&[]).unwrap();

        assert!(document.sheets.is_empty());
        assert!(document.bytes.starts_with(b"PK"));
        let mut workbook = open(&document.bytes);
        assert_eq!(workbook.sheet_names().len(), 1);
        let range = workbook.worksheet_range("Sheet1").unwrap();
        assert!(range.is_empty());
    }

    #[test]
    fn test_render_document_returns_bytes() {
        let bytes = render_document(&[single("Only")]).unwrap();
        assert_eq!(open(&bytes).sheet_names(), ["Only"]);
    }

    #[test]
    fn test_large_integers_keep_every_digit() {
        let mut table = ResultTable::new("Ids", vec![Column::with_type("id", 0, "BIGINT")]);
        for id in [i64::MAX, -(1 << 60), 1 << 53] {
            table.add_row(vec![NativeValue::Int(id)]).unwrap();
        }
        let bytes = render_document(&[table]).unwrap();

        let mut workbook = open(&bytes);
        let range = workbook.worksheet_range("Ids").unwrap();
        assert_eq!(range.get_value((1, 0)), Some(&Data::String(i64::MAX.to_string())));
        assert_eq!(range.get_value((2, 0)), Some(&Data::String((-(1i64 << 60)).to_string())));
        assert_eq!(range.get_value((3, 0)), Some(&Data::Float((1u64 << 53) as f64)));
    }

    #[test]
    fn test_header_only_table() {
        let table = ResultTable::new("Empty", vec![Column::with_type("id", 0, "INT")]);
        let document = DocumentBuilder::default().build(&[table]).unwrap();

        let mut workbook = open(&document.bytes);
        let range = workbook.worksheet_range("Empty").unwrap();
        assert_eq!(range.get_size(), (1, 1));
    }
}
