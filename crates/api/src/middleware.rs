use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use coursehub_auth::{AuthError, CredentialVerifier};

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub verifier: CredentialVerifier,
}

/// Basic-auth gate for protected routes.
///
/// On success the principal is attached to the request as [`CurrentUser`];
/// otherwise the handler never runs.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = authorization_header(req.headers());

    let principal = state
        .verifier
        .verify(header.as_deref())
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::Missing) {
                tracing::warn!(path = %req.uri().path(), "access denied: auth header not found");
            }
        })?;

    req.extensions_mut().insert(CurrentUser::new(principal));
    Ok(next.run(req).await)
}

fn authorization_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}
