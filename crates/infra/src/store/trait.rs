use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use coursehub_auth::{AccountDraft, LookupError, Principal, UserLookup};
use coursehub_core::{CourseId, DomainError, UserId, Violation};
use coursehub_courses::{Course, CourseChanges, CourseDraft};

/// Message attached to a duplicate `emailAddress`.
pub const EMAIL_IN_USE: &str = "That email address is already in use.";

/// Store operation error.
///
/// `Validation` and `UniqueConstraint` carry the ordered per-field violation
/// records; they are the only kinds a caller may turn into a client error.
/// Everything else is an infrastructure failure.
///
/// ## Error Categories
///
/// - **Validation**: a field rule rejected the data (nothing was written)
/// - **UniqueConstraint**: the data collides with an existing row
/// - **NotFound**: the row targeted by an update/delete no longer exists
/// - **Backend**: connectivity, pool, decoding or any other storage fault
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("validation failed: {} violation(s)", .0.len())]
    Validation(Vec<Violation>),

    #[error("unique constraint violated: {} violation(s)", .0.len())]
    UniqueConstraint(Vec<Violation>),

    #[error("record not found")]
    NotFound,

    #[error("store error in {operation}: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn backend(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Backend {
            operation,
            message: message.into(),
        }
    }

    pub(crate) fn email_in_use() -> Self {
        Self::UniqueConstraint(vec![Violation::new("emailAddress", EMAIL_IN_USE)])
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(violations) => Self::Validation(violations),
            DomainError::InvalidId(msg) => Self::backend("decode", msg),
        }
    }
}

/// Owner fields joined onto course listings (no secret or internal fields).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerSummary {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

impl From<&Principal> for OwnerSummary {
    fn from(p: &Principal) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            email_address: p.email_address.clone(),
        }
    }
}

/// A course joined with its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseWithOwner {
    pub course: Course,
    pub owner: OwnerSummary,
}

/// Row filter for [`CourseStore::find_courses`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub id: Option<CourseId>,
}

impl CourseFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: CourseId) -> Self {
        Self { id: Some(id) }
    }

    pub fn matches(&self, course: &Course) -> bool {
        self.id.is_none_or(|id| id == course.id)
    }
}

/// User persistence.
///
/// `create_user` validates the draft (every field rule, in order) and
/// enforces email uniqueness before writing.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, draft: AccountDraft) -> Result<UserId, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError>;
}

/// Course persistence.
///
/// `create_course` and `update_course` validate before writing and fail with
/// [`StoreError::Validation`] without touching the stored row.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn create_course(&self, draft: CourseDraft) -> Result<CourseId, StoreError>;

    /// Courses matching `filter`, joined with their owners, ordered by id.
    async fn find_courses(&self, filter: CourseFilter) -> Result<Vec<CourseWithOwner>, StoreError>;

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError>;

    async fn update_course(&self, id: CourseId, changes: CourseChanges)
    -> Result<Course, StoreError>;

    async fn destroy_course(&self, id: CourseId) -> Result<(), StoreError>;
}

#[async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn create_user(&self, draft: AccountDraft) -> Result<UserId, StoreError> {
        (**self).create_user(draft).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Principal>, StoreError> {
        (**self).find_user_by_email(email).await
    }
}

#[async_trait]
impl<S> CourseStore for Arc<S>
where
    S: CourseStore + ?Sized,
{
    async fn create_course(&self, draft: CourseDraft) -> Result<CourseId, StoreError> {
        (**self).create_course(draft).await
    }

    async fn find_courses(&self, filter: CourseFilter) -> Result<Vec<CourseWithOwner>, StoreError> {
        (**self).find_courses(filter).await
    }

    async fn find_course(&self, id: CourseId) -> Result<Option<Course>, StoreError> {
        (**self).find_course(id).await
    }

    async fn update_course(
        &self,
        id: CourseId,
        changes: CourseChanges,
    ) -> Result<Course, StoreError> {
        (**self).update_course(id, changes).await
    }

    async fn destroy_course(&self, id: CourseId) -> Result<(), StoreError> {
        (**self).destroy_course(id).await
    }
}

/// Adapts a [`UserStore`] to the credential verifier's lookup contract.
#[derive(Clone)]
pub struct UserStoreLookup(pub Arc<dyn UserStore>);

#[async_trait]
impl UserLookup for UserStoreLookup {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, LookupError> {
        self.0
            .find_user_by_email(email)
            .await
            .map_err(|e| LookupError(e.to_string()))
    }
}
