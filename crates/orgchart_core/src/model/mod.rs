//! Domain model for the department hierarchy.
//!
//! # Responsibility
//! - Define the department/employee records shared by repositories, services
//!   and the HTTP boundary.
//! - Own input normalization rules (trim, non-empty, length cap).
//!
//! # Invariants
//! - Ids are generated by the store and never reused.
//! - Children and employees of a department are read-time projections.

pub mod department;
pub mod employee;
pub mod validation;
