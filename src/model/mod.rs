//! Data model for query results and directory records

mod records;
mod schema;
mod table;

pub use records::{
    Department, DepartmentDeletion, FacilityType, MedicalWorker, Specialization, WorkerFields,
    WorkerFilter, WorkerUpdate,
};
pub use schema::{Column, TypeFamily};
pub use table::{NativeValue, ResultTable, TableError};
