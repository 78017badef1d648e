//! Department hierarchy consistency engine.
//!
//! Owns the department/employee schema, the hierarchy rules applied before
//! any write, the one-level subtree read and the cascade/reassign delete
//! transactions. The HTTP boundary lives in `orgchart_server`.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, LogTarget, LoggingError};
pub use model::department::{Department, DepartmentDetail, DepartmentId, DepartmentPatch};
pub use model::employee::{Employee, EmployeeId, NewEmployee};
pub use model::validation::{ValidationError, MAX_TEXT_CHARS};
pub use repo::department_repo::{DeleteOutcome, DepartmentRepository, SqliteDepartmentRepository};
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::error::{RepoError, RepoResult};
pub use service::department_service::{DeleteMode, DepartmentService};
pub use service::employee_service::EmployeeService;
pub use service::error::{ErrorKind, ServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
