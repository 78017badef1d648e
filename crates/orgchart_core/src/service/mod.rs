//! Core use-case services.
//!
//! # Responsibility
//! - Enforce hierarchy invariants before any write reaches the repository.
//! - Keep the HTTP boundary decoupled from storage details.

pub mod department_service;
pub mod employee_service;
pub mod error;
