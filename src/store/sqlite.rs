//! SQLite-backed directory store

use std::path::Path;
use std::time::Duration;

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::model::{
    Column, Department, DepartmentDeletion, FacilityType, MedicalWorker, ResultTable,
    Specialization, TypeFamily, WorkerFields, WorkerFilter,
};
use crate::update::{VersionToken, WorkerVersionStore};

use super::decode::native_value;
use super::{StoreError, MAX_IMAGE_BYTES};

const SCHEMA: &str = include_str!("schema.sql");
const SEED: &str = include_str!("seed.sql");

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const HIRE_DATE_FORMAT: &str = "%Y-%m-%d";

const WORKER_COLUMNS: &str = "
    worker_id, first_name, last_name, email, phone_number,
    department_id, department_name,
    specialization_id, specialization_name,
    CAST(hire_date AS TEXT) AS hire_date, salary, license_number,
    CASE WHEN image_data IS NULL THEN 0 ELSE 1 END AS has_image,
    lower(hex(row_version)) AS row_version,
    CAST((julianday('now') - julianday(hire_date)) / 365.25 AS INTEGER) || ' years' AS experience";

/// Directory store over a single SQLite connection
///
/// The connection is shared by every caller; each operation holds the lock
/// for exactly one statement sequence.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create tables, triggers and views that do not exist yet
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(SCHEMA)?;
        tracing::debug!("schema ready");
        Ok(())
    }

    /// Insert the example directory; rows that already exist are kept
    pub fn seed_example_data(&self) -> Result<(), StoreError> {
        self.conn.lock().execute_batch(SEED)?;
        tracing::info!("example data seeded");
        Ok(())
    }

    /// Run an arbitrary query and capture its columns, declared types and values
    pub fn query_table(&self, name: &str, sql: &str) -> Result<ResultTable, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;

        let columns: Vec<Column> = stmt
            .columns()
            .iter()
            .enumerate()
            .map(|(i, c)| Column::with_type(c.name(), i, c.decl_type().unwrap_or_default()))
            .collect();
        let families: Vec<TypeFamily> = columns.iter().map(Column::family).collect();
        let mut table = ResultTable::new(name, columns);

        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let values = families
                .iter()
                .enumerate()
                .map(|(i, family)| row.get_ref(i).map(|v| native_value(v, *family)))
                .collect::<Result<Vec<_>, _>>()?;
            table.add_row(values)?;
        }

        Ok(table)
    }

    pub fn list_facility_types(&self) -> Result<Vec<FacilityType>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT facility_type_id, type_name, COALESCE(description, '')
             FROM facility_types ORDER BY facility_type_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FacilityType {
                facility_type_id: row.get(0)?,
                type_name: row.get(1)?,
                description: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn list_specializations(&self) -> Result<Vec<Specialization>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT specialization_id, specialization_name, category
             FROM specializations ORDER BY specialization_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(Specialization {
                specialization_id: row.get(0)?,
                specialization_name: row.get(1)?,
                category: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// All departments ordered by name
    pub fn list_departments(&self) -> Result<Vec<Department>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT department_id, department_name, department_head, location, phone_number,
                    facility_type_id, created_date
             FROM departments ORDER BY department_name",
        )?;
        let rows = stmt.query_map([], department_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Departments belonging to one facility type, ordered by name
    pub fn departments_by_facility_type(
        &self,
        facility_type_id: i64,
    ) -> Result<Vec<Department>, StoreError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT department_id, department_name, department_head, location, phone_number,
                    facility_type_id, created_date
             FROM departments WHERE facility_type_id = ?1 ORDER BY department_name",
        )?;
        let rows = stmt.query_map([facility_type_id], department_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn department(&self, department_id: i64) -> Result<Department, StoreError> {
        self.conn
            .lock()
            .query_row(
                "SELECT department_id, department_name, department_head, location, phone_number,
                        facility_type_id, created_date
                 FROM departments WHERE department_id = ?1",
                [department_id],
                department_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("department", department_id))
    }

    /// Delete a department that no worker references
    pub fn delete_department(&self, department_id: i64) -> Result<DepartmentDeletion, StoreError> {
        let conn = self.conn.lock();

        let department_name: String = conn
            .query_row(
                "SELECT department_name FROM departments WHERE department_id = ?1",
                [department_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("department", department_id))?;

        let affected = conn.execute("DELETE FROM departments WHERE department_id = ?1", [department_id])?;
        if affected == 0 {
            return Err(StoreError::not_found("department", department_id));
        }

        let workers_deleted: i64 = conn.query_row(
            "SELECT COUNT(*) FROM medical_workers WHERE department_id = ?1",
            [department_id],
            |row| row.get(0),
        )?;

        Ok(DepartmentDeletion {
            department_id,
            department_name,
            workers_deleted,
        })
    }

    /// Workers matching the filter, ordered by last then first name
    pub fn list_workers(&self, filter: WorkerFilter) -> Result<Vec<MedicalWorker>, StoreError> {
        let conn = self.conn.lock();
        let sql = format!(
            "SELECT {WORKER_COLUMNS}
             FROM vw_medical_workers_detailed
             WHERE (?1 IS NULL OR department_id = ?1)
               AND (?2 IS NULL OR specialization_id = ?2)
             ORDER BY last_name, first_name"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![filter.department_id, filter.specialization_id],
            worker_from_row,
        )?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn worker(&self, worker_id: i64) -> Result<MedicalWorker, StoreError> {
        let sql = format!("SELECT {WORKER_COLUMNS} FROM vw_medical_workers_detailed WHERE worker_id = ?1");
        self.conn
            .lock()
            .query_row(&sql, [worker_id], worker_from_row)
            .optional()?
            .ok_or_else(|| StoreError::not_found("worker", worker_id))
    }

    /// Insert a worker and return its new id
    pub fn add_worker(&self, fields: &WorkerFields) -> Result<i64, StoreError> {
        check_fields(fields)?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO medical_workers
                (first_name, last_name, email, phone_number, department_id, specialization_id,
                 hire_date, salary, license_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                fields.first_name,
                fields.last_name,
                fields.email,
                fields.phone_number,
                fields.department_id,
                fields.specialization_id,
                fields.hire_date,
                fields.salary,
                fields.license_number,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Delete a worker; returns the number of rows removed
    pub fn delete_worker(&self, worker_id: i64) -> Result<usize, StoreError> {
        Ok(self
            .conn
            .lock()
            .execute("DELETE FROM medical_workers WHERE worker_id = ?1", [worker_id])?)
    }

    /// The worker's image, `None` when no image is stored
    pub fn worker_image(&self, worker_id: i64) -> Result<Option<Vec<u8>>, StoreError> {
        let image: Option<Vec<u8>> = self
            .conn
            .lock()
            .query_row(
                "SELECT image_data FROM medical_workers WHERE worker_id = ?1",
                [worker_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::not_found("worker", worker_id))?;
        Ok(image.filter(|bytes| !bytes.is_empty()))
    }

    pub fn set_worker_image(&self, worker_id: i64, image: &[u8]) -> Result<(), StoreError> {
        if image.len() > MAX_IMAGE_BYTES {
            return Err(StoreError::PayloadTooLarge {
                size: image.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        self.conn.lock().execute(
            "UPDATE medical_workers SET image_data = ?1 WHERE worker_id = ?2",
            params![image, worker_id],
        )?;
        Ok(())
    }

    pub fn clear_worker_image(&self, worker_id: i64) -> Result<(), StoreError> {
        self.conn.lock().execute(
            "UPDATE medical_workers SET image_data = NULL WHERE worker_id = ?1",
            [worker_id],
        )?;
        Ok(())
    }
}

impl WorkerVersionStore for SqliteStore {
    fn update_if_current(
        &self,
        worker_id: i64,
        token: &VersionToken,
        fields: &WorkerFields,
    ) -> Result<usize, StoreError> {
        check_fields(fields)?;
        Ok(self.conn.lock().execute(
            "UPDATE medical_workers
                SET first_name = ?1,
                    last_name = ?2,
                    email = ?3,
                    phone_number = ?4,
                    department_id = ?5,
                    specialization_id = ?6,
                    hire_date = ?7,
                    salary = ?8,
                    license_number = ?9
              WHERE worker_id = ?10
                AND row_version = ?11",
            params![
                fields.first_name,
                fields.last_name,
                fields.email,
                fields.phone_number,
                fields.department_id,
                fields.specialization_id,
                fields.hire_date,
                fields.salary,
                fields.license_number,
                worker_id,
                token.as_bytes(),
            ],
        )?)
    }

    fn worker_exists(&self, worker_id: i64) -> Result<bool, StoreError> {
        let found: Option<i64> = self
            .conn
            .lock()
            .query_row(
                "SELECT 1 FROM medical_workers WHERE worker_id = ?1",
                [worker_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }
}

/// Reject values that column affinity would silently retype
fn check_fields(fields: &WorkerFields) -> Result<(), StoreError> {
    if NaiveDate::parse_from_str(&fields.hire_date, HIRE_DATE_FORMAT).is_err() {
        return Err(StoreError::InvalidValue {
            field: "hire_date",
            value: fields.hire_date.clone(),
        });
    }
    Ok(())
}

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        department_id: row.get(0)?,
        department_name: row.get(1)?,
        department_head: row.get(2)?,
        location: row.get(3)?,
        phone_number: row.get(4)?,
        facility_type_id: row.get(5)?,
        created_date: row.get(6)?,
    })
}

fn worker_from_row(row: &Row<'_>) -> rusqlite::Result<MedicalWorker> {
    Ok(MedicalWorker {
        worker_id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        email: row.get(3)?,
        phone_number: row.get(4)?,
        department_id: row.get(5)?,
        department_name: row.get(6)?,
        specialization_id: row.get(7)?,
        specialization_name: row.get(8)?,
        hire_date: row.get(9)?,
        salary: row.get(10)?,
        license_number: row.get(11)?,
        has_image: row.get(12)?,
        row_version: row.get::<_, Option<String>>(13)?.unwrap_or_default(),
        experience: row.get::<_, Option<String>>(14)?.unwrap_or_default(),
    })
}
