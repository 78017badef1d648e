//! Department records and their read/write shapes.

use crate::model::employee::Employee;
use serde::{Deserialize, Serialize};

/// Store-generated department identifier.
pub type DepartmentId = i64;

/// One node of the department tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    /// Trimmed, non-empty, unique among departments.
    pub name: String,
    /// `None` means root-level department.
    pub parent_id: Option<DepartmentId>,
    /// Epoch ms, set by the store at insert.
    pub created_at: i64,
}

impl Department {
    /// Returns whether this department has no parent.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Department expanded one level: direct children and direct employees.
///
/// Grandchildren are never included; callers fetch them by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentDetail {
    #[serde(flatten)]
    pub department: Department,
    pub children: Vec<Department>,
    pub employees: Vec<Employee>,
}

/// Partial department update.
///
/// `parent_id` distinguishes "leave unchanged" (`None`) from "move to root"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub parent_id: Option<Option<DepartmentId>>,
}

impl DepartmentPatch {
    /// Patch that only renames.
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            parent_id: None,
        }
    }

    /// Patch that only changes the parent.
    pub fn reparent(parent_id: Option<DepartmentId>) -> Self {
        Self {
            name: None,
            parent_id: Some(parent_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_id.is_none()
    }
}
