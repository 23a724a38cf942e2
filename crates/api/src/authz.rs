//! API-side ownership guard for course mutations.
//!
//! Runs after the course has been fetched and before the store is asked to
//! change it.

use coursehub_auth::authorize;
use coursehub_courses::Course;

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

/// Refuse the mutation unless the current user owns `course`.
pub fn ensure_owner(current: &CurrentUser, course: &Course) -> Result<(), ApiError> {
    authorize(current.principal(), course).map_err(|e| {
        tracing::warn!(
            user_id = %current.id(),
            course_id = %course.id,
            owner_id = %course.user_id,
            "mutation refused: not the owner"
        );
        ApiError::from(e)
    })
}
