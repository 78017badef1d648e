//! Department hierarchy use-case service.
//!
//! # Responsibility
//! - Validate tree invariants above the repository layer.
//! - Provide create, fetch (one level), partial update and the two delete
//!   strategies.
//!
//! # Invariants
//! - A parent, when set, exists and is not the department itself.
//! - The parent relation stays acyclic: every parent-setting update walks the
//!   ancestor chain of the proposed parent, bounded by the department count,
//!   and the repository re-checks the moved subtree inside the write.
//! - Reassign targets exist, differ from the source and lie outside the
//!   source's subtree; the repository re-checks inside the transaction.

use crate::model::department::{Department, DepartmentDetail, DepartmentId, DepartmentPatch};
use crate::model::validation::{normalize_text, ValidationError};
use crate::repo::department_repo::{DeleteOutcome, DepartmentRepository};
use crate::repo::error::RepoError;
use crate::service::error::ServiceError;
use log::{debug, info, warn};

/// Department delete strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Delete the row; the schema removes descendants and their employees.
    Cascade,
    /// Move employees and direct children to `target_id`, then delete.
    Reassign { target_id: DepartmentId },
}

impl DeleteMode {
    /// Parses raw boundary input.
    ///
    /// `mode` must be exactly `cascade` or `reassign`; `target` is only read
    /// for `reassign` and must be an integer id.
    pub fn parse(mode: Option<&str>, target: Option<&str>) -> Result<Self, ValidationError> {
        match mode {
            Some("cascade") => Ok(Self::Cascade),
            Some("reassign") => {
                let raw = target
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .ok_or(ValidationError::MissingReassignTarget)?;
                let target_id = raw
                    .parse::<DepartmentId>()
                    .map_err(|_| ValidationError::InvalidReassignTarget(raw.to_string()))?;
                Ok(Self::Reassign { target_id })
            }
            other => Err(ValidationError::UnsupportedDeleteMode(
                other.map(str::to_string),
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::Reassign { .. } => "reassign",
        }
    }
}

/// Department hierarchy service facade.
pub struct DepartmentService<R: DepartmentRepository> {
    repo: R,
}

impl<R: DepartmentRepository> DepartmentService<R> {
    /// Creates service from repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one department under an optional parent.
    ///
    /// Name uniqueness is left to the store's unique constraint.
    pub fn create_department(
        &self,
        name: &str,
        parent_id: Option<DepartmentId>,
    ) -> Result<Department, ServiceError> {
        let normalized = normalize_text("name", name)?;
        if let Some(parent_id) = parent_id {
            self.ensure_parent_exists(parent_id)?;
        }

        let department = self
            .repo
            .create_department(normalized.as_str(), parent_id)
            .map_err(|err| parent_aware(err, parent_id))?;
        debug!(
            "event=department_create module=service status=ok department_id={} parent_id={:?}",
            department.id, department.parent_id
        );
        Ok(department)
    }

    /// Loads one department with direct children and direct employees.
    pub fn get_department(&self, id: DepartmentId) -> Result<DepartmentDetail, ServiceError> {
        self.repo
            .load_detail(id)?
            .ok_or(ServiceError::DepartmentNotFound(id))
    }

    /// Applies a partial update; rejected updates leave the row unchanged.
    pub fn update_department(
        &self,
        id: DepartmentId,
        patch: &DepartmentPatch,
    ) -> Result<Department, ServiceError> {
        let current = self
            .repo
            .get_department(id)?
            .ok_or(ServiceError::DepartmentNotFound(id))?;

        let name = patch
            .name
            .as_deref()
            .map(|value| normalize_text("name", value))
            .transpose()?;

        if let Some(Some(parent_id)) = patch.parent_id {
            if parent_id == id {
                return Err(ServiceError::SelfParent(id));
            }
            self.ensure_parent_exists(parent_id)?;
            if self.chain_contains(parent_id, id)? {
                return Err(ServiceError::CycleDetected {
                    department_id: id,
                    parent_id,
                });
            }
        }

        if patch.is_empty() {
            return Ok(current);
        }

        let updated = self
            .repo
            .update_department(id, name.as_deref(), patch.parent_id)
            .map_err(|err| parent_aware(err, patch.parent_id.flatten()))?;
        debug!(
            "event=department_update module=service status=ok department_id={} parent_id={:?}",
            updated.id, updated.parent_id
        );
        Ok(updated)
    }

    /// Deletes one department with the given strategy.
    pub fn delete_department(
        &self,
        id: DepartmentId,
        mode: DeleteMode,
    ) -> Result<DeleteOutcome, ServiceError> {
        let result = match mode {
            DeleteMode::Cascade => self.delete_cascade(id),
            DeleteMode::Reassign { target_id } => self.delete_reassign(id, target_id),
        };

        match &result {
            Ok(outcome) => info!(
                "event=department_delete module=service status=ok mode={} department_id={} departments_removed={} employees_removed={} employees_reassigned={} children_reparented={}",
                mode.as_str(),
                id,
                outcome.departments_removed,
                outcome.employees_removed,
                outcome.employees_reassigned,
                outcome.children_reparented
            ),
            Err(err) => warn!(
                "event=department_delete module=service status=error mode={} department_id={} error_kind={} error={}",
                mode.as_str(),
                id,
                err.kind().as_str(),
                err
            ),
        }
        result
    }

    fn delete_cascade(&self, id: DepartmentId) -> Result<DeleteOutcome, ServiceError> {
        self.repo.delete_cascade(id).map_err(Into::into)
    }

    fn delete_reassign(
        &self,
        id: DepartmentId,
        target_id: DepartmentId,
    ) -> Result<DeleteOutcome, ServiceError> {
        if target_id == id {
            return Err(ServiceError::ReassignTargetIsSource(id));
        }
        self.repo
            .get_department(id)?
            .ok_or(ServiceError::DepartmentNotFound(id))?;
        self.repo
            .get_department(target_id)?
            .ok_or(ServiceError::ReassignTargetNotFound(target_id))?;
        if self.chain_contains(target_id, id)? {
            return Err(ServiceError::ReassignTargetInSubtree {
                department_id: id,
                target_id,
            });
        }

        self.repo
            .delete_reassign(id, target_id)
            .map_err(|err| match err {
                RepoError::DepartmentNotFound(missing) if missing == target_id => {
                    ServiceError::ReassignTargetNotFound(target_id)
                }
                other => other.into(),
            })
    }

    /// Fails with `DepartmentNotFound` unless the department exists.
    pub fn ensure_department_exists(&self, id: DepartmentId) -> Result<(), ServiceError> {
        self.repo
            .get_department(id)?
            .ok_or(ServiceError::DepartmentNotFound(id))?;
        Ok(())
    }

    fn ensure_parent_exists(&self, parent_id: DepartmentId) -> Result<(), ServiceError> {
        self.repo
            .get_department(parent_id)?
            .ok_or(ServiceError::ParentNotFound(parent_id))?;
        Ok(())
    }

    /// Returns whether `needle` is `start` or one of its ancestors.
    ///
    /// The walk stops after as many steps as there are departments; running
    /// past that bound means the stored chain already loops and is treated as
    /// containing `needle`. A vanished ancestor ends the chain.
    fn chain_contains(
        &self,
        start: DepartmentId,
        needle: DepartmentId,
    ) -> Result<bool, ServiceError> {
        let bound = self.repo.count_departments()?;
        let mut cursor = Some(start);
        let mut steps: u64 = 0;
        while let Some(current) = cursor {
            if current == needle {
                return Ok(true);
            }
            if steps >= bound {
                return Ok(true);
            }
            steps += 1;

            cursor = match self.repo.get_department(current)? {
                Some(department) => department.parent_id,
                None => None,
            };
        }
        Ok(false)
    }
}

fn parent_aware(err: RepoError, parent_id: Option<DepartmentId>) -> ServiceError {
    match err {
        RepoError::DepartmentNotFound(missing) if Some(missing) == parent_id => {
            ServiceError::ParentNotFound(missing)
        }
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::DeleteMode;
    use crate::model::validation::ValidationError;

    #[test]
    fn parse_accepts_cascade_without_target() {
        assert_eq!(
            DeleteMode::parse(Some("cascade"), None).unwrap(),
            DeleteMode::Cascade
        );
    }

    #[test]
    fn parse_ignores_target_for_cascade() {
        assert_eq!(
            DeleteMode::parse(Some("cascade"), Some("not-a-number")).unwrap(),
            DeleteMode::Cascade
        );
    }

    #[test]
    fn parse_reads_reassign_target() {
        assert_eq!(
            DeleteMode::parse(Some("reassign"), Some(" 42 ")).unwrap(),
            DeleteMode::Reassign { target_id: 42 }
        );
    }

    #[test]
    fn parse_rejects_missing_or_blank_target() {
        for target in [None, Some(""), Some("   ")] {
            assert_eq!(
                DeleteMode::parse(Some("reassign"), target).unwrap_err(),
                ValidationError::MissingReassignTarget
            );
        }
    }

    #[test]
    fn parse_rejects_unparsable_target() {
        assert_eq!(
            DeleteMode::parse(Some("reassign"), Some("abc")).unwrap_err(),
            ValidationError::InvalidReassignTarget("abc".to_string())
        );
    }

    #[test]
    fn parse_rejects_unknown_and_missing_mode() {
        assert_eq!(
            DeleteMode::parse(Some("Cascade"), None).unwrap_err(),
            ValidationError::UnsupportedDeleteMode(Some("Cascade".to_string()))
        );
        assert_eq!(
            DeleteMode::parse(None, Some("1")).unwrap_err(),
            ValidationError::UnsupportedDeleteMode(None)
        );
    }
}
