use axum::extract::{FromRequest, Request};
use axum::{async_trait, Json};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use std::sync::Arc;

use coursehub_auth::{AccountDraft, HashError, PasswordInput, Principal, SecretHasher};
use coursehub_core::{CourseId, UserId};
use coursehub_courses::{CourseChanges, CourseDraft};
use coursehub_infra::{CourseWithOwner, OwnerSummary};

use crate::app::errors::ApiError;

// -------------------------
// Extractors
// -------------------------

/// `Json` whose rejection renders as `{"errors": [...]}`.
pub struct JsonBody<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`).
fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email_address: Option<String>,
    pub password: Option<String>,
}

impl CreateUserRequest {
    /// Hash the password (if any) and hand the rest over unvalidated.
    pub async fn into_draft(self, hasher: &Arc<dyn SecretHasher>) -> Result<AccountDraft, HashError> {
        Ok(AccountDraft {
            password: PasswordInput::from_plain(self.password, hasher).await?,
            first_name: self.first_name,
            last_name: self.last_name,
            email_address: self.email_address,
        })
    }
}

/// Body of `POST /api/courses`. A `userId` field, if sent, is ignored: the
/// owner is always the authenticated user.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
}

impl CreateCourseRequest {
    pub fn into_draft(self, owner: UserId) -> CourseDraft {
        CourseDraft {
            title: self.title,
            description: self.description,
            estimated_time: self.estimated_time,
            materials_needed: self.materials_needed,
            user_id: owner,
        }
    }
}

/// Partial body of `PUT /api/courses/:id`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub materials_needed: Option<Option<String>>,
}

impl From<UpdateCourseRequest> for CourseChanges {
    fn from(body: UpdateCourseRequest) -> Self {
        Self {
            title: body.title,
            description: body.description,
            estimated_time: body.estimated_time,
            materials_needed: body.materials_needed,
        }
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserResponse {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&Principal> for CurrentUserResponse {
    fn from(p: &Principal) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            email: p.email_address.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

impl From<OwnerSummary> for OwnerResponse {
    fn from(o: OwnerSummary) -> Self {
        Self {
            id: o.id,
            first_name: o.first_name,
            last_name: o.last_name,
            email_address: o.email_address,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseResponse {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub estimated_time: Option<String>,
    pub materials_needed: Option<String>,
    pub user_id: UserId,
    #[serde(rename = "User")]
    pub user: OwnerResponse,
}

impl From<CourseWithOwner> for CourseResponse {
    fn from(row: CourseWithOwner) -> Self {
        let CourseWithOwner { course, owner } = row;
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            estimated_time: course.estimated_time,
            materials_needed: course.materials_needed,
            user_id: course.user_id,
            user: owner.into(),
        }
    }
}
