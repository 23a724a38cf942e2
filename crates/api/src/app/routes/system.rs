use axum::{http::StatusCode, Json};
use serde_json::{json, Value};

use crate::app::errors::ApiError;

pub const WELCOME_MESSAGE: &str = "Welcome to the REST API project!";

pub async fn welcome() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
