//! Full directory export
//!
//! A fixed catalogue of named queries, one per sheet. Each query runs on its
//! own; a query that fails becomes a skipped sheet rather than a failed report.

use chrono::NaiveDateTime;

use crate::document::{ColumnLayout, Document, DocumentBuilder, DocumentError};
use crate::render::CellRenderer;
use crate::store::SqliteStore;

pub use crate::document::CONTENT_TYPE;

/// One sheet of the report: its name and the query that fills it
#[derive(Debug, Clone, Copy)]
pub struct ReportSheet {
    pub name: &'static str,
    pub query: &'static str,
}

pub const FACILITY_TYPES: &str = "Facility Types";
pub const DEPARTMENTS: &str = "Departments";
pub const SPECIALIZATIONS: &str = "Specializations";
pub const MEDICAL_WORKERS: &str = "Medical Workers";
pub const MEDICAL_WORKERS_VIEW: &str = "Medical Workers View";
pub const DEPARTMENT_STATISTICS: &str = "Department Statistics";

const DEPARTMENT_STATISTICS_QUERY: &str = "
SELECT
    d.department_id,
    d.department_name,
    f.type_name AS facility_type,
    d.location,
    d.department_head,
    d.phone_number,
    COUNT(w.worker_id) AS total_workers,
    COUNT(DISTINCT w.specialization_id) AS unique_specializations,
    ROUND(AVG(w.salary), 2) AS avg_salary,
    CAST(MIN(w.salary) AS REAL) AS min_salary,
    CAST(MAX(w.salary) AS REAL) AS max_salary,
    CAST(TOTAL(w.salary) AS REAL) AS total_salary,
    MIN(w.hire_date) AS earliest_hire_date,
    MAX(w.hire_date) AS latest_hire_date,
    ROUND(AVG((julianday('now') - julianday(w.hire_date)) / 365.25), 1) AS avg_years_experience,
    d.created_date,
    (SELECT s.specialization_name
       FROM medical_workers mw
       JOIN specializations s ON s.specialization_id = mw.specialization_id
      WHERE mw.department_id = d.department_id
      GROUP BY s.specialization_id
      ORDER BY COUNT(*) DESC, s.specialization_name
      LIMIT 1) AS most_common_specialization
FROM departments d
JOIN facility_types f ON f.facility_type_id = d.facility_type_id
LEFT JOIN medical_workers w ON w.department_id = d.department_id
GROUP BY d.department_id
ORDER BY d.department_id";

/// Sheets of the full export, in workbook order
pub const SHEETS: [ReportSheet; 6] = [
    ReportSheet {
        name: FACILITY_TYPES,
        query: "SELECT facility_type_id, type_name, description, typical_bed_capacity, \
                accreditation_required FROM facility_types ORDER BY facility_type_id",
    },
    ReportSheet {
        name: DEPARTMENTS,
        query: "SELECT department_id, department_name, department_head, location, phone_number, \
                facility_type_id, created_date FROM departments ORDER BY department_id",
    },
    ReportSheet {
        name: SPECIALIZATIONS,
        query: "SELECT specialization_id, specialization_name, description, category, \
                required_years_training, certification_required FROM specializations \
                ORDER BY specialization_id",
    },
    ReportSheet {
        name: MEDICAL_WORKERS,
        query: "SELECT worker_id, first_name, last_name, email, phone_number, department_id, \
                specialization_id, hire_date, salary, license_number, image_data, created_date, \
                row_version FROM medical_workers ORDER BY worker_id",
    },
    ReportSheet {
        name: MEDICAL_WORKERS_VIEW,
        query: "SELECT worker_id, first_name, last_name, email, phone_number, department_id, \
                department_name, specialization_id, specialization_name, hire_date, salary, \
                license_number, image_data, row_version FROM vw_medical_workers_detailed \
                ORDER BY worker_id",
    },
    ReportSheet {
        name: DEPARTMENT_STATISTICS,
        query: DEPARTMENT_STATISTICS_QUERY,
    },
];

const WORKER_WIDTHS: [(usize, f64); 7] = [
    (0, 8.0),
    (1, 12.0),
    (2, 12.0),
    (3, 25.0),
    (4, 15.0),
    (9, 12.0),
    (10, 15.0),
];

const STATISTICS_WIDTHS: [(usize, f64); 17] = [
    (0, 8.0),
    (1, 20.0),
    (2, 15.0),
    (3, 15.0),
    (4, 20.0),
    (5, 15.0),
    (6, 12.0),
    (7, 8.0),
    (8, 12.0),
    (9, 12.0),
    (10, 12.0),
    (11, 15.0),
    (12, 15.0),
    (13, 15.0),
    (14, 8.0),
    (15, 15.0),
    (16, 25.0),
];

/// Column widths used by the full export
pub fn layout(default_width: f64) -> ColumnLayout {
    ColumnLayout::new(default_width)
        .with_overrides(MEDICAL_WORKERS, &WORKER_WIDTHS)
        .with_overrides(MEDICAL_WORKERS_VIEW, &WORKER_WIDTHS)
        .with_overrides(DEPARTMENT_STATISTICS, &STATISTICS_WIDTHS)
}

/// Document builder configured for the full export
pub fn builder(default_width: f64) -> DocumentBuilder {
    DocumentBuilder::new(CellRenderer::default(), layout(default_width))
}

/// Run every report query and assemble the workbook
pub fn generate(store: &SqliteStore, builder: &DocumentBuilder) -> Result<Document, DocumentError> {
    let sections = SHEETS.iter().map(|sheet| {
        store.query_table(sheet.name, sheet.query).map_err(|err| {
            tracing::error!(sheet = sheet.name, error = %err, "report query failed");
            err
        })
    });
    let document = builder.build_sections(sections)?;
    tracing::info!(
        sheets = document.sheets.len(),
        skipped = document.skipped.len(),
        "report generated"
    );
    Ok(document)
}

/// Download name for a report produced at `now`
pub fn export_filename(now: NaiveDateTime) -> String {
    format!("medical_database_full_report_{}.xlsx", now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use chrono::NaiveDate;

    use super::*;
    use crate::document::DEFAULT_COLUMN_WIDTH;

    fn seeded() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store.seed_example_data().unwrap();
        store
    }

    #[test]
    fn test_export_filename() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(export_filename(now), "medical_database_full_report_20240309_070501.xlsx");
    }

    #[test]
    fn test_worker_layout() {
        let widths = layout(DEFAULT_COLUMN_WIDTH).widths_for(MEDICAL_WORKERS, 13);
        assert_eq!(widths[0], 8.0);
        assert_eq!(widths[3], 25.0);
        assert_eq!(widths[5], 15.0);
        assert_eq!(widths[10], 15.0);
        assert_eq!(widths[12], 15.0);
    }

    #[test]
    fn test_statistics_query_matches_layout() {
        let store = seeded();
        let table = store
            .query_table(DEPARTMENT_STATISTICS, DEPARTMENT_STATISTICS_QUERY)
            .unwrap();
        assert_eq!(table.column_count(), STATISTICS_WIDTHS.len());
        assert_eq!(table.row_count(), 4);
    }

    #[test]
    fn test_generate_full_report() {
        let store = seeded();
        let document = generate(&store, &builder(DEFAULT_COLUMN_WIDTH)).unwrap();

        assert!(document.skipped.is_empty());
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(document.bytes)).unwrap();
        let names: Vec<&str> = SHEETS.iter().map(|s| s.name).collect();
        assert_eq!(workbook.sheet_names(), names);

        let workers = workbook.worksheet_range(MEDICAL_WORKERS).unwrap();
        assert_eq!(workers.get_size(), (6, 13));
        assert_eq!(workers.get_value((0, 12)), Some(&Data::String("row_version".into())));
        match workers.get_value((1, 12)) {
            Some(Data::String(hex)) => assert_eq!(hex.len(), 16),
            other => panic!("unexpected version cell: {other:?}"),
        }
    }

    #[test]
    fn test_failed_query_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("directory.db");
        let store = SqliteStore::open(&path).unwrap();
        store.init_schema().unwrap();
        store.seed_example_data().unwrap();

        rusqlite::Connection::open(&path)
            .unwrap()
            .execute_batch("DROP VIEW vw_medical_workers_detailed")
            .unwrap();

        let document = generate(&store, &builder(DEFAULT_COLUMN_WIDTH)).unwrap();
        assert_eq!(document.sheets.len(), 5);
        assert_eq!(document.skipped.len(), 1);
        assert!(!document.sheets.iter().any(|s| s == MEDICAL_WORKERS_VIEW));
    }
}
