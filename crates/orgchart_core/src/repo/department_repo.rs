//! Department repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist department rows and expose the one-level subtree read.
//! - Own the cascade and reassign delete transactions.
//!
//! # Invariants
//! - Child and employee listings are ordered by id (store insertion order).
//! - Detail reads run inside one read transaction and never observe a
//!   half-applied reassign.
//! - A parent change re-checks the new parent against the moved subtree
//!   inside the write transaction, so concurrent moves cannot store a loop.
//! - Reassign either moves every employee, re-parents every direct child and
//!   removes the source, or changes nothing.

use crate::model::department::{Department, DepartmentDetail, DepartmentId};
use crate::repo::employee_repo::list_employees_of;
use crate::repo::error::{is_foreign_key_violation, is_unique_violation, RepoError, RepoResult};
use crate::repo::readiness::ensure_connection_ready;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const DEPARTMENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    parent_id,
    created_at
FROM departments";

/// Rows affected by a department delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// Departments removed, including descendants removed by cascade.
    pub departments_removed: usize,
    /// Employees removed together with their department.
    pub employees_removed: usize,
    /// Employees moved to the reassign target.
    pub employees_reassigned: usize,
    /// Direct children re-parented onto the reassign target.
    pub children_reparented: usize,
}

/// Repository interface for department tree operations.
pub trait DepartmentRepository {
    /// Inserts one department; `name` must already be normalized.
    fn create_department(
        &self,
        name: &str,
        parent_id: Option<DepartmentId>,
    ) -> RepoResult<Department>;
    /// Loads one department by id.
    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    /// Loads one department with its direct children and direct employees.
    fn load_detail(&self, id: DepartmentId) -> RepoResult<Option<DepartmentDetail>>;
    /// Applies supplied fields in one write transaction and returns the stored
    /// row; a new parent inside the department's subtree is `CycleDetected`.
    fn update_department(
        &self,
        id: DepartmentId,
        name: Option<&str>,
        parent_id: Option<Option<DepartmentId>>,
    ) -> RepoResult<Department>;
    /// Total number of departments; bounds ancestor walks.
    fn count_departments(&self) -> RepoResult<u64>;
    /// Deletes one department; the schema cascades to descendants and employees.
    fn delete_cascade(&self, id: DepartmentId) -> RepoResult<DeleteOutcome>;
    /// Moves employees and direct children to `target_id`, then deletes `id`.
    fn delete_reassign(
        &self,
        id: DepartmentId,
        target_id: DepartmentId,
    ) -> RepoResult<DeleteOutcome>;
}

/// SQLite-backed department repository.
pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["departments", "employees"])?;
        Ok(Self { conn })
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create_department(
        &self,
        name: &str,
        parent_id: Option<DepartmentId>,
    ) -> RepoResult<Department> {
        let inserted = self.conn.execute(
            "INSERT INTO departments (name, parent_id) VALUES (?1, ?2);",
            params![name, parent_id],
        );
        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::DuplicateDepartmentName(name.to_string()));
            }
            Err(err) if is_foreign_key_violation(&err) => {
                return Err(RepoError::DepartmentNotFound(parent_id.unwrap_or_default()));
            }
            Err(err) => return Err(err.into()),
        }

        load_required_department(self.conn, self.conn.last_insert_rowid())
    }

    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        load_department(self.conn, id)
    }

    fn load_detail(&self, id: DepartmentId) -> RepoResult<Option<DepartmentDetail>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Deferred)?;
        let Some(department) = load_department(&tx, id)? else {
            return Ok(None);
        };
        let children = list_children_of(&tx, id)?;
        let employees = list_employees_of(&tx, id)?;
        tx.commit()?;

        Ok(Some(DepartmentDetail {
            department,
            children,
            employees,
        }))
    }

    fn update_department(
        &self,
        id: DepartmentId,
        name: Option<&str>,
        parent_id: Option<Option<DepartmentId>>,
    ) -> RepoResult<Department> {
        run_write_transaction(self.conn, |tx| {
            ensure_department_exists(tx, id)?;
            if let Some(Some(new_parent)) = parent_id {
                ensure_department_exists(tx, new_parent)?;
                if subtree_contains(tx, id, new_parent)? {
                    return Err(RepoError::CycleDetected {
                        department_id: id,
                        parent_id: new_parent,
                    });
                }
            }

            let updated = tx.execute(
                "UPDATE departments
                 SET name = COALESCE(?2, name),
                     parent_id = CASE WHEN ?3 = 1 THEN ?4 ELSE parent_id END
                 WHERE id = ?1;",
                params![id, name, parent_id.is_some(), parent_id.flatten()],
            );
            match updated {
                Ok(_) => {}
                Err(err) if is_unique_violation(&err) => {
                    return Err(RepoError::DuplicateDepartmentName(
                        name.unwrap_or_default().to_string(),
                    ));
                }
                Err(err) if is_foreign_key_violation(&err) => {
                    return Err(RepoError::DepartmentNotFound(
                        parent_id.flatten().unwrap_or(id),
                    ));
                }
                Err(err) => return Err(err.into()),
            }

            load_required_department(tx, id)
        })
    }

    fn count_departments(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM departments;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative department count {count}")))
    }

    fn delete_cascade(&self, id: DepartmentId) -> RepoResult<DeleteOutcome> {
        run_write_transaction(self.conn, |tx| {
            ensure_department_exists(tx, id)?;
            let (departments_removed, employees_removed) = count_subtree(tx, id)?;
            tx.execute("DELETE FROM departments WHERE id = ?1;", [id])?;

            Ok(DeleteOutcome {
                departments_removed,
                employees_removed,
                ..DeleteOutcome::default()
            })
        })
    }

    fn delete_reassign(
        &self,
        id: DepartmentId,
        target_id: DepartmentId,
    ) -> RepoResult<DeleteOutcome> {
        run_write_transaction(self.conn, |tx| {
            ensure_department_exists(tx, id)?;
            ensure_department_exists(tx, target_id)?;
            if subtree_contains(tx, id, target_id)? {
                return Err(RepoError::TargetInsideSubtree {
                    department_id: id,
                    target_id,
                });
            }

            let employees_reassigned = tx.execute(
                "UPDATE employees
                 SET department_id = ?2
                 WHERE department_id = ?1;",
                params![id, target_id],
            )?;
            let children_reparented = tx.execute(
                "UPDATE departments
                 SET parent_id = ?2
                 WHERE parent_id = ?1;",
                params![id, target_id],
            )?;
            let departments_removed =
                tx.execute("DELETE FROM departments WHERE id = ?1;", [id])?;
            if departments_removed == 0 {
                return Err(RepoError::DepartmentNotFound(id));
            }

            Ok(DeleteOutcome {
                departments_removed,
                employees_removed: 0,
                employees_reassigned,
                children_reparented,
            })
        })
    }
}

/// Runs `body` inside an immediate transaction.
///
/// Transport errors raised after `BEGIN` are reported as
/// `RepoError::Transaction`; dropping the transaction on any error rolls back.
fn run_write_transaction<T>(
    conn: &Connection,
    body: impl FnOnce(&Transaction<'_>) -> RepoResult<T>,
) -> RepoResult<T> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(|err| RepoError::from(err).in_transaction())?;
    let value = body(&tx).map_err(RepoError::in_transaction)?;
    tx.commit()
        .map_err(|err| RepoError::from(err).in_transaction())?;
    Ok(value)
}

fn ensure_department_exists(conn: &Connection, id: DepartmentId) -> RepoResult<()> {
    let found: Option<i64> = conn
        .query_row("SELECT id FROM departments WHERE id = ?1;", [id], |row| {
            row.get(0)
        })
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(RepoError::DepartmentNotFound(id)),
    }
}

fn subtree_contains(
    conn: &Connection,
    root_id: DepartmentId,
    candidate_id: DepartmentId,
) -> RepoResult<bool> {
    let contains: i64 = conn.query_row(
        "WITH RECURSIVE subtree(id) AS (
            SELECT id FROM departments WHERE id = ?1
            UNION
            SELECT child.id
            FROM departments child
            INNER JOIN subtree parent ON child.parent_id = parent.id
        )
        SELECT EXISTS(SELECT 1 FROM subtree WHERE id = ?2);",
        params![root_id, candidate_id],
        |row| row.get(0),
    )?;
    Ok(contains == 1)
}

fn count_subtree(conn: &Connection, id: DepartmentId) -> RepoResult<(usize, usize)> {
    let (departments, employees): (i64, i64) = conn.query_row(
        "WITH RECURSIVE subtree(id) AS (
            SELECT id FROM departments WHERE id = ?1
            UNION
            SELECT child.id
            FROM departments child
            INNER JOIN subtree parent ON child.parent_id = parent.id
        )
        SELECT
            (SELECT COUNT(*) FROM subtree),
            (SELECT COUNT(*) FROM employees WHERE department_id IN (SELECT id FROM subtree));",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    Ok((to_count(departments)?, to_count(employees)?))
}

fn to_count(value: i64) -> RepoResult<usize> {
    usize::try_from(value).map_err(|_| RepoError::InvalidData(format!("invalid row count {value}")))
}

fn load_department(conn: &Connection, id: DepartmentId) -> RepoResult<Option<Department>> {
    let mut stmt = conn.prepare(&format!("{DEPARTMENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_department_row(row)?));
    }
    Ok(None)
}

fn load_required_department(conn: &Connection, id: DepartmentId) -> RepoResult<Department> {
    load_department(conn, id)?.ok_or(RepoError::DepartmentNotFound(id))
}

fn list_children_of(conn: &Connection, parent_id: DepartmentId) -> RepoResult<Vec<Department>> {
    let mut stmt = conn.prepare(&format!(
        "{DEPARTMENT_SELECT_SQL}
         WHERE parent_id = ?1
         ORDER BY id ASC;"
    ))?;
    let mut rows = stmt.query([parent_id])?;
    let mut items = Vec::new();
    while let Some(row) = rows.next()? {
        items.push(parse_department_row(row)?);
    }
    Ok(items)
}

fn parse_department_row(row: &Row<'_>) -> RepoResult<Department> {
    let id: DepartmentId = row.get("id")?;
    let name: String = row.get("name")?;
    if name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "department {id} has blank name"
        )));
    }

    let parent_id: Option<DepartmentId> = row.get("parent_id")?;
    if parent_id == Some(id) {
        return Err(RepoError::InvalidData(format!(
            "department {id} is its own parent"
        )));
    }

    Ok(Department {
        id,
        name,
        parent_id,
        created_at: row.get("created_at")?,
    })
}
