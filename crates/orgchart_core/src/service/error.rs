//! Service-level error taxonomy.
//!
//! Every variant belongs to exactly one `ErrorKind`; the HTTP boundary maps
//! kinds to status codes and never inspects variants.

use crate::model::department::DepartmentId;
use crate::model::employee::EmployeeId;
use crate::model::validation::ValidationError;
use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse error class used for status mapping and log fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing caller input.
    Validation,
    /// Referenced entity is absent.
    NotFound,
    /// Uniqueness or hierarchy invariant would be violated.
    Conflict,
    /// Atomic unit failed to commit and was rolled back.
    Transaction,
    /// Storage or data failure not attributable to the caller.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Transaction => "transaction",
            Self::Internal => "internal",
        }
    }
}

/// Errors from department and employee services.
#[derive(Debug)]
pub enum ServiceError {
    Validation(ValidationError),
    DepartmentNotFound(DepartmentId),
    /// Proposed parent department does not exist.
    ParentNotFound(DepartmentId),
    /// Reassign target department does not exist.
    ReassignTargetNotFound(DepartmentId),
    EmployeeNotFound(EmployeeId),
    DuplicateDepartmentName(String),
    /// Department cannot be its own parent.
    SelfParent(DepartmentId),
    /// Setting the parent would close a loop through the ancestor chain.
    CycleDetected {
        department_id: DepartmentId,
        parent_id: DepartmentId,
    },
    /// Reassign target equals the department being deleted.
    ReassignTargetIsSource(DepartmentId),
    /// Reassign target is a descendant of the department being deleted.
    ReassignTargetInSubtree {
        department_id: DepartmentId,
        target_id: DepartmentId,
    },
    /// Write transaction failed and was rolled back.
    Transaction(RepoError),
    /// Repository-level failure.
    Repo(RepoError),
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DepartmentNotFound(_)
            | Self::ParentNotFound(_)
            | Self::ReassignTargetNotFound(_)
            | Self::EmployeeNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateDepartmentName(_)
            | Self::SelfParent(_)
            | Self::CycleDetected { .. }
            | Self::ReassignTargetIsSource(_)
            | Self::ReassignTargetInSubtree { .. } => ErrorKind::Conflict,
            Self::Transaction(_) => ErrorKind::Transaction,
            Self::Repo(_) => ErrorKind::Internal,
        }
    }
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DepartmentNotFound(id) => write!(f, "department not found: {id}"),
            Self::ParentNotFound(id) => write!(f, "parent department not found: {id}"),
            Self::ReassignTargetNotFound(id) => {
                write!(f, "reassign target department not found: {id}")
            }
            Self::EmployeeNotFound(id) => write!(f, "employee not found: {id}"),
            Self::DuplicateDepartmentName(name) => {
                write!(f, "department with name `{name}` already exists")
            }
            Self::SelfParent(id) => write!(f, "department {id} cannot be its own parent"),
            Self::CycleDetected {
                department_id,
                parent_id,
            } => write!(
                f,
                "moving department {department_id} under {parent_id} would create a cycle"
            ),
            Self::ReassignTargetIsSource(id) => write!(
                f,
                "cannot reassign employees of department {id} to itself"
            ),
            Self::ReassignTargetInSubtree {
                department_id,
                target_id,
            } => write!(
                f,
                "reassign target {target_id} is inside the subtree of department {department_id}"
            ),
            Self::Transaction(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Transaction(err) | Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DepartmentNotFound(id) => Self::DepartmentNotFound(id),
            RepoError::EmployeeNotFound(id) => Self::EmployeeNotFound(id),
            RepoError::DuplicateDepartmentName(name) => Self::DuplicateDepartmentName(name),
            RepoError::TargetInsideSubtree {
                department_id,
                target_id,
            } => Self::ReassignTargetInSubtree {
                department_id,
                target_id,
            },
            RepoError::CycleDetected {
                department_id,
                parent_id,
            } => Self::CycleDetected {
                department_id,
                parent_id,
            },
            err @ RepoError::Transaction(_) => Self::Transaction(err),
            other => Self::Repo(other),
        }
    }
}
