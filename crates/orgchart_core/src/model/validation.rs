//! Input validation errors and text normalization.
//!
//! # Invariants
//! - Validation never touches storage.
//! - Normalized text is trimmed and at most `MAX_TEXT_CHARS` characters.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Upper bound for department names, employee names and positions.
pub const MAX_TEXT_CHARS: usize = 200;

/// Caller input that is malformed or missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty after trim.
    BlankField(&'static str),
    /// Text field exceeds `max_chars` after trim.
    FieldTooLong {
        field: &'static str,
        max_chars: usize,
    },
    /// Delete mode missing or not `cascade`/`reassign`.
    UnsupportedDeleteMode(Option<String>),
    /// `reassign` delete without a target department.
    MissingReassignTarget,
    /// Target department id is not an integer.
    InvalidReassignTarget(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::FieldTooLong { field, max_chars } => {
                write!(f, "{field} must be at most {max_chars} characters")
            }
            Self::UnsupportedDeleteMode(Some(mode)) => write!(
                f,
                "unsupported delete mode `{mode}`; expected cascade|reassign"
            ),
            Self::UnsupportedDeleteMode(None) => {
                write!(f, "delete mode is required; expected cascade|reassign")
            }
            Self::MissingReassignTarget => {
                write!(f, "reassign_to_department_id is required for mode=reassign")
            }
            Self::InvalidReassignTarget(value) => {
                write!(f, "invalid reassign_to_department_id `{value}`")
            }
        }
    }
}

impl Error for ValidationError {}

/// Trims `value` and checks it is non-empty and within `MAX_TEXT_CHARS`.
pub fn normalize_text(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    if trimmed.chars().count() > MAX_TEXT_CHARS {
        return Err(ValidationError::FieldTooLong {
            field,
            max_chars: MAX_TEXT_CHARS,
        });
    }
    Ok(trimmed.to_string())
}
