//! Repository error type shared by department and employee persistence.

use crate::db::DbError;
use crate::model::department::DepartmentId;
use crate::model::employee::EmployeeId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error outside a write transaction.
    Db(DbError),
    /// Target department does not exist.
    DepartmentNotFound(DepartmentId),
    /// Target employee does not exist.
    EmployeeNotFound(EmployeeId),
    /// `departments.name` unique constraint rejected the write.
    DuplicateDepartmentName(String),
    /// Reassign target lies inside the subtree of the department being deleted.
    TargetInsideSubtree {
        department_id: DepartmentId,
        target_id: DepartmentId,
    },
    /// New parent lies inside the subtree of the department being moved.
    CycleDetected {
        department_id: DepartmentId,
        parent_id: DepartmentId,
    },
    /// Storage failure inside a write transaction; the transaction was rolled back.
    Transaction(DbError),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted to a valid read model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DepartmentNotFound(id) => write!(f, "department not found: {id}"),
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::DuplicateDepartmentName(name) => {
                write!(f, "department name already exists: {name}")
            }
            Self::TargetInsideSubtree {
                department_id,
                target_id,
            } => write!(
                f,
                "department {target_id} is inside the subtree of department {department_id}"
            ),
            Self::CycleDetected {
                department_id,
                parent_id,
            } => write!(
                f,
                "department {parent_id} is inside the subtree of department {department_id}"
            ),
            Self::Transaction(err) => write!(f, "transaction rolled back: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "repository requires table `{table}`")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) | Self::Transaction(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl RepoError {
    /// Reclassifies a transport error raised inside a write transaction.
    ///
    /// Semantic errors (not-found, duplicate) pass through unchanged.
    pub(crate) fn in_transaction(self) -> Self {
        match self {
            Self::Db(err) => Self::Transaction(err),
            other => other,
        }
    }
}

pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    constraint_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE)
}

pub(crate) fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    constraint_code(err) == Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn constraint_code(err: &rusqlite::Error) -> Option<i32> {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => Some(failure.extended_code),
        _ => None,
    }
}
