//! Rendered cell representation

use chrono::NaiveDateTime;

/// Display-format hint consumed by the document styling layer only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatHint {
    /// Monetary amount, shown as `$#,##0.00`
    Currency,
}

impl FormatHint {
    /// Spreadsheet number format for this hint
    pub fn number_format(self) -> &'static str {
        match self {
            FormatHint::Currency => "$#,##0.00",
        }
    }
}

/// The six kinds a rendered cell can take
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Timestamp(NaiveDateTime),
    Empty,
}

/// Output of rendering one native value
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCell {
    pub kind: CellKind,
    pub hint: Option<FormatHint>,
}

impl RenderedCell {
    fn plain(kind: CellKind) -> Self {
        Self { kind, hint: None }
    }

    pub fn text(s: String) -> Self {
        Self::plain(CellKind::Text(s))
    }

    pub fn integer(i: i64) -> Self {
        Self::plain(CellKind::Integer(i))
    }

    pub fn real(f: f64) -> Self {
        Self::plain(CellKind::Real(f))
    }

    pub fn boolean(b: bool) -> Self {
        Self::plain(CellKind::Boolean(b))
    }

    pub fn timestamp(dt: NaiveDateTime) -> Self {
        Self::plain(CellKind::Timestamp(dt))
    }

    pub fn empty() -> Self {
        Self::plain(CellKind::Empty)
    }

    /// Attach a format hint; the value itself is unchanged
    pub fn with_hint(mut self, hint: FormatHint) -> Self {
        self.hint = Some(hint);
        self
    }

    pub fn kind(&self) -> &CellKind {
        &self.kind
    }
}
