//! Employee use-case service.
//!
//! # Invariants
//! - The owning department is checked before the payload is validated, so a
//!   missing department wins over a malformed body.
//! - Names and positions reach the repository trimmed and non-empty.

use crate::model::department::DepartmentId;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::validation::normalize_text;
use crate::repo::employee_repo::EmployeeRepository;
use crate::service::error::ServiceError;
use log::debug;

/// Employee service facade.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one employee in an existing department.
    pub fn create_employee(&self, request: &NewEmployee) -> Result<Employee, ServiceError> {
        self.ensure_department_exists(request.department_id)?;

        let normalized = NewEmployee {
            department_id: request.department_id,
            full_name: normalize_text("full_name", &request.full_name)?,
            position: normalize_text("position", &request.position)?,
            hired_at: request.hired_at,
        };
        let employee = self.repo.create_employee(&normalized)?;
        debug!(
            "event=employee_create module=service status=ok employee_id={} department_id={}",
            employee.id, employee.department_id
        );
        Ok(employee)
    }

    /// Loads one employee by id.
    pub fn get_employee(&self, id: EmployeeId) -> Result<Employee, ServiceError> {
        self.repo
            .get_employee(id)?
            .ok_or(ServiceError::EmployeeNotFound(id))
    }

    /// Lists employees attached directly to one department.
    pub fn list_employees(
        &self,
        department_id: DepartmentId,
    ) -> Result<Vec<Employee>, ServiceError> {
        self.ensure_department_exists(department_id)?;
        self.repo
            .list_by_department(department_id)
            .map_err(Into::into)
    }

    /// Fails with `DepartmentNotFound` unless the department exists.
    pub fn ensure_department_exists(
        &self,
        department_id: DepartmentId,
    ) -> Result<(), ServiceError> {
        if self.repo.department_exists(department_id)? {
            Ok(())
        } else {
            Err(ServiceError::DepartmentNotFound(department_id))
        }
    }
}
