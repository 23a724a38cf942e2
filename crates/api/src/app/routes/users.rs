use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::app::dto::{CreateUserRequest, CurrentUserResponse, JsonBody};
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

/// `GET /api/users`: the authenticated user's public fields.
pub async fn current_user(Extension(current): Extension<CurrentUser>) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse::from(current.principal()))
}

/// `POST /api/users`: register an account.
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    JsonBody(body): JsonBody<CreateUserRequest>,
) -> Result<Response, ApiError> {
    let draft = body.into_draft(&services.hasher).await?;
    let id = services.users.create_user(draft).await?;
    tracing::info!(user_id = %id, "account created");

    Ok((StatusCode::CREATED, [(LOCATION, "/")]).into_response())
}
