//! Directory records exchanged with callers as JSON

use serde::{Deserialize, Serialize};

/// A kind of healthcare facility (hospital, clinic, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityType {
    pub facility_type_id: i64,
    pub type_name: String,
    #[serde(default)]
    pub description: String,
}

/// A medical specialization a worker can hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialization {
    pub specialization_id: i64,
    pub specialization_name: String,
    pub category: String,
}

/// A department within a facility type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Department {
    pub department_id: i64,
    pub department_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_head: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub facility_type_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date: Option<String>,
}

/// A medical worker as listed by the directory, joined with names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalWorker {
    pub worker_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub department_id: i64,
    pub department_name: String,
    pub specialization_id: i64,
    pub specialization_name: String,
    pub hire_date: String,
    pub salary: f64,
    pub license_number: String,
    pub has_image: bool,
    /// Current version token, lowercase hex
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub row_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub experience: String,
}

/// The editable fields of a worker, used for inserts and updates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub department_id: i64,
    pub specialization_id: i64,
    pub hire_date: String,
    pub salary: f64,
    pub license_number: String,
}

/// An update request: new field values plus the version the caller last read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerUpdate {
    #[serde(flatten)]
    pub fields: WorkerFields,
    #[serde(default)]
    pub row_version: String,
}

/// Filter for worker listings; absent fields match everything
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerFilter {
    pub department_id: Option<i64>,
    pub specialization_id: Option<i64>,
}

/// What a successful department deletion reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentDeletion {
    pub department_id: i64,
    pub department_name: String,
    pub workers_deleted: i64,
}
