//! Session middleware
//!
//! The client declares who it is with two headers. Nothing is verified: roles
//! only gate which routes a client may call and are not a security boundary.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use eventrec_common::session::{Role, Session};
use tracing::debug;

use super::ApiError;

/// User name header
pub const USER_HEADER: &str = "x-eventrec-user";

/// Role header (`view` or `edit`); missing means `view`
pub const ROLE_HEADER: &str = "x-eventrec-role";

/// Attach a [`Session`] to the request or reject with 401
pub async fn session_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let headers = request.headers();

    let username = headers
        .get(USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let role = match headers.get(ROLE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(raw) => raw.parse::<Role>()?,
        None => Role::View,
    };

    let session = Session::login(username, role).map_err(|_| ApiError::LoginRequired)?;
    debug!(
        "{} {} as {} ({})",
        request.method(),
        request.uri().path(),
        session.username,
        session.role
    );

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Extractor for routes that change data; rejects `view` sessions with 403
#[derive(Debug, Clone)]
pub struct EditorSession(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for EditorSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(ApiError::LoginRequired)?;

        if !session.can_edit() {
            return Err(ApiError::Forbidden(format!(
                "'{}' has view access only",
                session.username
            )));
        }

        Ok(EditorSession(session))
    }
}
