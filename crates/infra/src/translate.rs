//! Store failure → client validation failure.
//!
//! Only validation and uniqueness failures are client errors; everything
//! else is handed back untouched so the caller can surface it as a server
//! error.

use crate::store::StoreError;

/// Client-facing list of validation messages, in the order the rules ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub messages: Vec<String>,
}

/// Translate a store error into a validation failure, or return it unchanged.
pub fn translate(err: StoreError) -> Result<ValidationFailure, StoreError> {
    match err {
        StoreError::Validation(violations) | StoreError::UniqueConstraint(violations) => {
            Ok(ValidationFailure {
                messages: violations.into_iter().map(|v| v.message).collect(),
            })
        }
        other => Err(other),
    }
}
