//! Employee repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Inserts rely on the `employees.department_id` foreign key; a department
//!   removed between the service check and the insert surfaces as
//!   `DepartmentNotFound`.
//! - Listings are ordered by id, i.e. insertion order.

use crate::model::department::DepartmentId;
use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::repo::error::{is_foreign_key_violation, RepoError, RepoResult};
use crate::repo::readiness::ensure_connection_ready;
use rusqlite::{params, Connection, Row};

pub(crate) const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    department_id,
    full_name,
    position,
    hired_at,
    created_at
FROM employees";

/// Repository interface for employee rows.
pub trait EmployeeRepository {
    /// Inserts one employee; text fields must already be normalized.
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee>;
    /// Loads one employee by id.
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Lists employees attached directly to one department.
    fn list_by_department(&self, department_id: DepartmentId) -> RepoResult<Vec<Employee>>;
    /// Returns whether the department row exists.
    fn department_exists(&self, department_id: DepartmentId) -> RepoResult<bool>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["departments", "employees"])?;
        Ok(Self { conn })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        let inserted = self.conn.execute(
            "INSERT INTO employees (
                department_id,
                full_name,
                position,
                hired_at
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                employee.department_id,
                employee.full_name.as_str(),
                employee.position.as_str(),
                employee.hired_at,
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_foreign_key_violation(&err) => {
                return Err(RepoError::DepartmentNotFound(employee.department_id));
            }
            Err(err) => return Err(err.into()),
        }

        let id = self.conn.last_insert_rowid();
        self.get_employee(id)?
            .ok_or(RepoError::EmployeeNotFound(id))
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }
        Ok(None)
    }

    fn list_by_department(&self, department_id: DepartmentId) -> RepoResult<Vec<Employee>> {
        list_employees_of(self.conn, department_id)
    }

    fn department_exists(&self, department_id: DepartmentId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM departments WHERE id = ?1);",
            [department_id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

pub(crate) fn list_employees_of(
    conn: &Connection,
    department_id: DepartmentId,
) -> RepoResult<Vec<Employee>> {
    let mut stmt = conn.prepare(&format!(
        "{EMPLOYEE_SELECT_SQL}
         WHERE department_id = ?1
         ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([department_id])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_employee_row(row)?);
    }
    Ok(items)
}

pub(crate) fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let full_name: String = row.get("full_name")?;
    let position: String = row.get("position")?;
    if full_name.trim().is_empty() || position.trim().is_empty() {
        let id: i64 = row.get("id")?;
        return Err(RepoError::InvalidData(format!(
            "employee {id} has blank full_name or position"
        )));
    }

    Ok(Employee {
        id: row.get("id")?,
        department_id: row.get("department_id")?,
        full_name,
        position,
        hired_at: row.get("hired_at")?,
        created_at: row.get("created_at")?,
    })
}
