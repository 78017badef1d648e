//! Repository layer: SQL and transaction boundaries.
//!
//! # Responsibility
//! - Isolate SQLite query details from service-level hierarchy rules.
//! - Own every multi-statement transaction.
//!
//! # Invariants
//! - Repositories only accept connections migrated to the latest schema.
//! - Constraint violations surface as semantic errors (`DepartmentNotFound`,
//!   `DuplicateDepartmentName`) in addition to transport errors.

pub mod department_repo;
pub mod employee_repo;
pub mod error;
mod readiness;
