use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use coursehub_auth::{AuthError, AuthzError, HashError, NOT_OWNER_MESSAGE};
use coursehub_infra::{translate, StoreError, ValidationFailure};

pub const ACCESS_DENIED: &str = "Access Denied";
pub const COURSE_NOT_FOUND: &str = "Course not found.";
pub const INVALID_COURSE_ID: &str = "Invalid course id.";
pub const ROUTE_NOT_FOUND: &str = "Route Not Found";

/// Every failure a handler or middleware can produce.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Access Denied")]
    Unauthenticated,

    #[error(transparent)]
    Forbidden(#[from] AuthzError),

    #[error("validation failed: {}", .0.messages.join(", "))]
    Validation(ValidationFailure),

    #[error("{0}")]
    MalformedBody(String),

    #[error("Course not found.")]
    CourseNotFound,

    #[error("Invalid course id.")]
    InvalidCourseId,

    #[error("Route Not Found")]
    RouteNotFound,

    #[error("{0}")]
    Store(StoreError),

    #[error("{0}")]
    AuthBackend(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match translate(err) {
            Ok(failure) => Self::Validation(failure),
            Err(other) => Self::Store(other),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Missing | AuthError::InvalidCredentials => Self::Unauthenticated,
            AuthError::Lookup(msg) | AuthError::Verification(msg) => Self::AuthBackend(msg),
        }
    }
}

impl From<HashError> for ApiError {
    fn from(err: HashError) -> Self {
        Self::AuthBackend(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Unauthenticated => json_error(StatusCode::UNAUTHORIZED, ACCESS_DENIED),
            Self::Forbidden(_) => json_error(StatusCode::FORBIDDEN, NOT_OWNER_MESSAGE),
            Self::Validation(failure) => errors_list(failure.messages),
            Self::MalformedBody(msg) => errors_list(vec![msg]),
            Self::CourseNotFound => json_error(StatusCode::BAD_REQUEST, COURSE_NOT_FOUND),
            Self::InvalidCourseId => json_error(StatusCode::BAD_REQUEST, INVALID_COURSE_ID),
            Self::RouteNotFound => json_error(StatusCode::NOT_FOUND, ROUTE_NOT_FOUND),
            Self::Store(_) | Self::AuthBackend(_) => {
                tracing::error!(error = %self, "unhandled failure");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        }
    }
}

/// `{"message": ...}` body with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "message": message.into(),
        })),
    )
        .into_response()
}

fn errors_list(messages: Vec<String>) -> Response {
    (StatusCode::BAD_REQUEST, axum::Json(json!({ "errors": messages }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursehub_core::Violation;

    #[test]
    fn store_validation_becomes_a_client_error() {
        let err = ApiError::from(StoreError::UniqueConstraint(vec![Violation::new(
            "emailAddress",
            "That email address is already in use.",
        )]));
        let ApiError::Validation(failure) = &err else {
            panic!("expected validation, got {err:?}");
        };
        assert_eq!(failure.messages, vec!["That email address is already in use."]);
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn backend_failure_is_a_server_error() {
        let err = ApiError::from(StoreError::backend("find_courses", "connection refused"));
        assert!(matches!(err, ApiError::Store(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn auth_errors_split_between_401_and_500() {
        assert!(matches!(ApiError::from(AuthError::Missing), ApiError::Unauthenticated));
        assert!(matches!(
            ApiError::from(AuthError::InvalidCredentials),
            ApiError::Unauthenticated
        ));
        let err = ApiError::from(AuthError::Lookup("pool closed".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = ApiError::from(AuthError::Verification("task panicked".to_string()));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn hashing_failure_is_a_server_error() {
        let err = ApiError::from(HashError("invalid cost".to_string()));
        assert!(matches!(err, ApiError::AuthBackend(_)));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
