//! Request handlers
//!
//! Each handler takes already-extracted inputs (ids, filters, raw JSON
//! bodies) and returns a status code with a body, mapping store and update
//! failures to the directory's public error vocabulary. Transport is left to
//! the caller.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{json, Value};

use crate::document::DocumentBuilder;
use crate::model::{WorkerFields, WorkerFilter, WorkerUpdate};
use crate::report;
use crate::store::{SqliteStore, StoreError};
use crate::update::{apply_versioned_update, UpdateError, UpdateOutcome};

pub const CONCURRENCY_CONFLICT: &str = "CONCURRENCY_CONFLICT";
pub const CONSTRAINT_ERROR: &str = "CONSTRAINT_ERROR";

const CONFLICT_MESSAGE: &str =
    "This record has been modified by another user since you loaded it. Please reload and try again.";
const DEPARTMENT_IN_USE_MESSAGE: &str =
    "Cannot delete department because it has related medical workers. Delete the workers first.";

const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Response payload
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    /// Plain-text error message
    Text(String),
    Binary {
        content_type: &'static str,
        filename: Option<String>,
        data: Vec<u8>,
    },
    Empty,
}

/// Status code plus body produced by a handler
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Body,
}

impl ApiResponse {
    fn json(status: u16, value: Value) -> Self {
        Self {
            status,
            body: Body::Json(value),
        }
    }

    fn ok<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::json(200, value),
            Err(err) => {
                tracing::error!(error = %err, "response serialization failed");
                Self::text(500, "Internal server error")
            }
        }
    }

    fn message(text: impl Into<String>) -> Self {
        Self::json(200, json!({ "message": text.into() }))
    }

    fn text(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            body: Body::Text(text.into()),
        }
    }

    fn coded(status: u16, code: &str, message: &str) -> Self {
        Self::json(status, json!({ "error": code, "message": message }))
    }

    fn no_content() -> Self {
        Self {
            status: 204,
            body: Body::Empty,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Process exit code for command-line callers
    pub fn exit_code(&self) -> i32 {
        match self.status {
            200..=299 => 0,
            404 => 3,
            409 => 4,
            _ => 2,
        }
    }
}

fn database_error(err: StoreError, message: &str) -> ApiResponse {
    tracing::error!(error = %err, "{message}");
    ApiResponse::text(500, message)
}

fn invalid_field(field: &str, value: &str) -> ApiResponse {
    tracing::warn!(field, value, "rejected field value");
    ApiResponse::text(400, format!("Invalid {field} format"))
}

fn invalid_json(err: serde_json::Error) -> ApiResponse {
    tracing::warn!(error = %err, "rejected request body");
    ApiResponse::text(400, "Invalid JSON")
}

pub fn facility_types(store: &SqliteStore) -> ApiResponse {
    match store.list_facility_types() {
        Ok(types) => ApiResponse::ok(&types),
        Err(err) => database_error(err, "Database error"),
    }
}

pub fn specializations(store: &SqliteStore) -> ApiResponse {
    match store.list_specializations() {
        Ok(specializations) => ApiResponse::ok(&specializations),
        Err(err) => database_error(err, "Database error"),
    }
}

/// All departments, or those of one facility type
pub fn departments(store: &SqliteStore, facility_type_id: Option<i64>) -> ApiResponse {
    let result = match facility_type_id {
        Some(id) => store.departments_by_facility_type(id),
        None => store.list_departments(),
    };
    match result {
        Ok(departments) => ApiResponse::ok(&departments),
        Err(err) => database_error(err, "Database error"),
    }
}

pub fn department(store: &SqliteStore, department_id: i64) -> ApiResponse {
    match store.department(department_id) {
        Ok(department) => ApiResponse::ok(&department),
        Err(StoreError::NotFound { .. }) => ApiResponse::text(404, "Department not found"),
        Err(err) => database_error(err, "Database error"),
    }
}

pub fn delete_department(store: &SqliteStore, department_id: i64) -> ApiResponse {
    match store.delete_department(department_id) {
        Ok(deletion) => ApiResponse::json(
            200,
            json!({
                "message": format!("Department '{}' deleted successfully", deletion.department_name),
                "workers_deleted": deletion.workers_deleted,
                "department_id": deletion.department_id,
            }),
        ),
        Err(StoreError::NotFound { .. }) => ApiResponse::text(404, "Department not found"),
        Err(StoreError::ConstraintViolation(detail)) => {
            tracing::info!(department_id, %detail, "department still referenced");
            ApiResponse::coded(409, CONSTRAINT_ERROR, DEPARTMENT_IN_USE_MESSAGE)
        }
        Err(err) => database_error(err, "Failed to delete department"),
    }
}

pub fn workers(store: &SqliteStore, filter: WorkerFilter) -> ApiResponse {
    match store.list_workers(filter) {
        Ok(workers) => ApiResponse::ok(&workers),
        Err(err) => database_error(err, "Database error"),
    }
}

pub fn worker(store: &SqliteStore, worker_id: i64) -> ApiResponse {
    match store.worker(worker_id) {
        Ok(worker) => ApiResponse::ok(&worker),
        Err(StoreError::NotFound { .. }) => ApiResponse::text(404, "Worker not found"),
        Err(err) => database_error(err, "Failed to get worker"),
    }
}

/// Insert a worker from a JSON body
pub fn add_worker(store: &SqliteStore, body: &str) -> ApiResponse {
    let fields: WorkerFields = match serde_json::from_str(body) {
        Ok(fields) => fields,
        Err(err) => return invalid_json(err),
    };
    match store.add_worker(&fields) {
        Ok(worker_id) => ApiResponse::json(
            200,
            json!({
                "message": "Medical worker added successfully",
                "worker_id": worker_id,
            }),
        ),
        Err(StoreError::InvalidValue { field, value }) => invalid_field(field, &value),
        Err(err) => database_error(err, "Failed to insert worker"),
    }
}

/// Versioned update from a JSON body carrying the fields and `row_version`
pub fn update_worker(store: &SqliteStore, worker_id: i64, body: &str) -> ApiResponse {
    let update: WorkerUpdate = match serde_json::from_str(body) {
        Ok(update) => update,
        Err(err) => return invalid_json(err),
    };

    match apply_versioned_update(store, worker_id, &update.row_version, &update.fields) {
        Ok(UpdateOutcome::Applied) => ApiResponse::message("Medical worker updated successfully"),
        Ok(UpdateOutcome::RecordNotFound) => ApiResponse::text(404, "Worker not found"),
        Ok(UpdateOutcome::VersionConflict) => {
            ApiResponse::coded(409, CONCURRENCY_CONFLICT, CONFLICT_MESSAGE)
        }
        Err(UpdateError::Token(err)) => {
            tracing::warn!(error = %err, "rejected version token");
            ApiResponse::text(400, "Invalid row_version format")
        }
        Err(UpdateError::MissingVersion) => ApiResponse::text(400, "row_version is required"),
        Err(UpdateError::Store(StoreError::InvalidValue { field, value })) => {
            invalid_field(field, &value)
        }
        Err(UpdateError::Store(err)) => database_error(err, "Failed to update worker"),
    }
}

pub fn delete_worker(store: &SqliteStore, worker_id: i64) -> ApiResponse {
    match store.delete_worker(worker_id) {
        Ok(0) => ApiResponse::text(404, "Worker not found"),
        Ok(_) => ApiResponse::message("Medical worker deleted successfully"),
        Err(err) => database_error(err, "Failed to delete worker"),
    }
}

/// Stored image bytes; 204 when the worker has none
pub fn worker_image(store: &SqliteStore, worker_id: i64) -> ApiResponse {
    match store.worker_image(worker_id) {
        Ok(Some(data)) => ApiResponse {
            status: 200,
            body: Body::Binary {
                content_type: IMAGE_CONTENT_TYPE,
                filename: None,
                data,
            },
        },
        Ok(None) => ApiResponse::no_content(),
        Err(StoreError::NotFound { .. }) => ApiResponse::text(404, "Worker not found"),
        Err(err) => database_error(err, "Database error"),
    }
}

pub fn upload_worker_image(store: &SqliteStore, worker_id: i64, image: &[u8]) -> ApiResponse {
    match store.set_worker_image(worker_id, image) {
        Ok(()) => ApiResponse::message("Image uploaded successfully"),
        Err(StoreError::PayloadTooLarge { size, limit }) => {
            tracing::warn!(worker_id, size, limit, "image rejected");
            ApiResponse::text(400, "File too large")
        }
        Err(err) => database_error(err, "Database error"),
    }
}

pub fn delete_worker_image(store: &SqliteStore, worker_id: i64) -> ApiResponse {
    match store.clear_worker_image(worker_id) {
        Ok(()) => ApiResponse::message("Image deleted successfully"),
        Err(err) => database_error(err, "Database error"),
    }
}

/// The full spreadsheet export, named for the time it was produced
pub fn download_report(store: &SqliteStore, builder: &DocumentBuilder, now: NaiveDateTime) -> ApiResponse {
    match report::generate(store, builder) {
        Ok(document) => ApiResponse {
            status: 200,
            body: Body::Binary {
                content_type: report::CONTENT_TYPE,
                filename: Some(report::export_filename(now)),
                data: document.into_bytes(),
            },
        },
        Err(err) => {
            tracing::error!(error = %err, "report generation failed");
            ApiResponse::text(500, "Failed to generate report")
        }
    }
}
