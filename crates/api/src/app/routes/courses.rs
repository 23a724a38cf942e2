use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use coursehub_core::CourseId;
use coursehub_courses::Course;
use coursehub_infra::{CourseFilter, StoreError};

use crate::app::dto::{CourseResponse, CreateCourseRequest, JsonBody, UpdateCourseRequest};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CurrentUser;

/// `GET /api/courses`: every course with its owner, ordered by id.
pub async fn list_courses(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let rows = services.courses.find_courses(CourseFilter::all()).await?;
    Ok(Json(rows.into_iter().map(CourseResponse::from).collect()))
}

/// `GET /api/courses/:id`: zero or one course, as an array.
pub async fn get_course(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let id = parse_course_id(&id)?;
    let rows = services.courses.find_courses(CourseFilter::by_id(id)).await?;
    Ok(Json(rows.into_iter().map(CourseResponse::from).collect()))
}

/// `POST /api/courses`: create a course owned by the current user.
pub async fn create_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(body): JsonBody<CreateCourseRequest>,
) -> Result<Response, ApiError> {
    let id = services
        .courses
        .create_course(body.into_draft(current.id()))
        .await?;
    tracing::info!(course_id = %id, user_id = %current.id(), "course created");

    Ok((StatusCode::CREATED, [(LOCATION, format!("/api/courses/{id}"))]).into_response())
}

/// `PUT /api/courses/:id`: partial update, owner only.
pub async fn update_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(body): JsonBody<UpdateCourseRequest>,
) -> Result<StatusCode, ApiError> {
    let course = owned_course(&services, &current, &id).await?;

    services
        .courses
        .update_course(course.id, body.into())
        .await
        .map_err(course_store_error)?;
    tracing::info!(course_id = %course.id, "course updated");

    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/courses/:id`: owner only.
pub async fn delete_course(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let course = owned_course(&services, &current, &id).await?;

    services
        .courses
        .destroy_course(course.id)
        .await
        .map_err(course_store_error)?;
    tracing::info!(course_id = %course.id, "course deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// Fetch the target of a mutation and check ownership.
async fn owned_course(
    services: &AppServices,
    current: &CurrentUser,
    raw_id: &str,
) -> Result<Course, ApiError> {
    let id = parse_course_id(raw_id)?;
    let course = services
        .courses
        .find_course(id)
        .await?
        .ok_or(ApiError::CourseNotFound)?;
    authz::ensure_owner(current, &course)?;
    Ok(course)
}

fn parse_course_id(raw: &str) -> Result<CourseId, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidCourseId)
}

// The row can vanish between the ownership check and the write.
fn course_store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound => ApiError::CourseNotFound,
        other => other.into(),
    }
}
