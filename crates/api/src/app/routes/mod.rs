use axum::{
    handler::Handler,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::middleware::{auth_middleware, AuthState};

pub mod courses;
pub mod system;
pub mod users;

/// Every endpoint. Handlers that need a verified Basic credential carry the
/// auth layer individually, so a method a path does not support is answered
/// with 405 before any credential check.
pub fn router(auth: AuthState) -> Router {
    let auth = from_fn_with_state(auth, auth_middleware);

    Router::new()
        .route("/", get(system::welcome))
        .route("/health", get(system::health))
        .route(
            "/api/users",
            post(users::create_user).get(users::current_user.layer(auth.clone())),
        )
        .route(
            "/api/courses",
            get(courses::list_courses).post(courses::create_course.layer(auth.clone())),
        )
        .route(
            "/api/courses/:id",
            get(courses::get_course)
                .put(courses::update_course.layer(auth.clone()))
                .delete(courses::delete_course.layer(auth)),
        )
}
