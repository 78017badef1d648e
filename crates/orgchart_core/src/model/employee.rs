//! Employee records.
//!
//! # Invariants
//! - `department_id` points at an existing department outside of an open
//!   transaction.
//! - `full_name` and `position` are stored trimmed and non-empty.

use crate::model::department::DepartmentId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-generated employee identifier.
pub type EmployeeId = i64;

/// Employee attached to exactly one department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub department_id: DepartmentId,
    pub full_name: String,
    pub position: String,
    /// Calendar date, serialized as `YYYY-MM-DD`.
    pub hired_at: Option<NaiveDate>,
    /// Epoch ms, set by the store at insert.
    pub created_at: i64,
}

/// Employee creation input.
///
/// Text fields are normalized by the service before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub department_id: DepartmentId,
    pub full_name: String,
    pub position: String,
    pub hired_at: Option<NaiveDate>,
}

impl NewEmployee {
    pub fn new(
        department_id: DepartmentId,
        full_name: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        Self {
            department_id,
            full_name: full_name.into(),
            position: position.into(),
            hired_at: None,
        }
    }

    pub fn hired_at(mut self, date: NaiveDate) -> Self {
        self.hired_at = Some(date);
        self
    }
}
