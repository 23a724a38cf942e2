//! Course entity (owned by exactly one user).
//!
//! # Invariants
//! - `user_id` is set at creation and never changes; [`CourseChanges`] has no
//!   owner field.
//! - `title` and `description` are never empty.

use chrono::{DateTime, Utc};

use coursehub_core::rules::{non_empty_if_present, required_text};
use coursehub_core::{CourseId, DomainError, DomainResult, Entity, Owned, UserId, Violation};

const TITLE_REQUIRED: &str = "A title is required";
const TITLE_EMPTY: &str = "Please provide a title";
const DESCRIPTION_REQUIRED: &str = "A description is required";
const DESCRIPTION_EMPTY: &str = "Please provide a description";

/// A stored course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Course {
    type Id = CourseId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Owned for Course {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}

/// Unvalidated course data for creation. The owner comes from the
/// authenticated request, never from the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: UserId,
}

/// Course data that passed every field rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: UserId,
}

impl CourseDraft {
    pub fn validate(self) -> DomainResult<NewCourse> {
        let mut violations = Vec::new();
        let title = required_text(
            &mut violations,
            "title",
            self.title,
            TITLE_REQUIRED,
            TITLE_EMPTY,
        );
        let description = required_text(
            &mut violations,
            "description",
            self.description,
            DESCRIPTION_REQUIRED,
            DESCRIPTION_EMPTY,
        );

        match (title, description) {
            (Some(title), Some(description)) if violations.is_empty() => Ok(NewCourse {
                title,
                description,
                estimated_time: self.estimated_time,
                materials_needed: self.materials_needed,
                user_id: self.user_id,
            }),
            _ => Err(DomainError::Validation(violations)),
        }
    }
}

/// Partial update of a course.
///
/// Outer `None` leaves a field untouched; `Some(None)` is an explicit null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseChanges {
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub estimated_time: Option<Option<String>>,
    pub materials_needed: Option<Option<String>>,
}

impl CourseChanges {
    /// Check the supplied fields only, in declaration order.
    pub fn validate(&self) -> DomainResult<()> {
        let mut violations = Vec::new();
        check_required_change(&mut violations, "title", &self.title, TITLE_REQUIRED, TITLE_EMPTY);
        check_required_change(
            &mut violations,
            "description",
            &self.description,
            DESCRIPTION_REQUIRED,
            DESCRIPTION_EMPTY,
        );
        DomainError::check(violations)
    }
}

fn check_required_change(
    violations: &mut Vec<Violation>,
    field: &'static str,
    change: &Option<Option<String>>,
    missing: &str,
    empty: &str,
) {
    match change {
        None => {}
        Some(None) => violations.push(Violation::new(field, missing)),
        Some(Some(v)) => non_empty_if_present(violations, field, Some(v.as_str()), empty),
    }
}

impl Course {
    /// Apply validated changes; bumps `updated_at`.
    pub fn apply(&mut self, changes: CourseChanges, now: DateTime<Utc>) -> DomainResult<()> {
        changes.validate()?;
        if let Some(Some(title)) = changes.title {
            self.title = title;
        }
        if let Some(Some(description)) = changes.description {
            self.description = description;
        }
        if let Some(estimated_time) = changes.estimated_time {
            self.estimated_time = estimated_time;
        }
        if let Some(materials_needed) = changes.materials_needed {
            self.materials_needed = materials_needed;
        }
        self.updated_at = now;
        Ok(())
    }
}
