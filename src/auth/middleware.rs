use crate::auth::service::Authenticator;
use crate::types::AppError;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

/// Body of every gate rejection.
pub const INVALID_CREDENTIAL_MESSAGE: &str = "Your request is made with invalid credential";

/// Routes reachable without a token, as exact `(path, method)` pairs.
pub const PUBLIC_ROUTES: &[(&str, Method)] = &[
    ("/users/register", Method::POST),
    ("/users/login", Method::POST),
    ("/", Method::GET),
];

pub fn is_public_route(path: &str, method: &Method) -> bool {
    PUBLIC_ROUTES
        .iter()
        .any(|(public_path, public_method)| *public_path == path && public_method == method)
}

/// Removes every `"Bearer "` occurrence, not only a leading one.
pub fn strip_bearer(header_value: &str) -> String {
    header_value.replace("Bearer ", "")
}

/// Identity attached to requests that passed the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i64,
}

/// Global gate: lets allow-listed routes through, requires a valid token for the rest.
pub async fn request_gate(
    State(authenticator): State<Arc<dyn Authenticator>>,
    mut req: Request,
    next: Next,
) -> Response {
    if is_public_route(req.uri().path(), req.method()) {
        return next.run(req).await;
    }

    let raw = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();
    let token = strip_bearer(raw);

    match authenticator.authorize(&token) {
        Ok(result) if result.is_authorized => {
            req.extensions_mut().insert(AuthenticatedUser {
                user_id: result.user_id,
            });
            next.run(req).await
        }
        Ok(_) => reject(&req, "token not authorized"),
        Err(e) => reject(&req, &e.to_string()),
    }
}

fn reject(req: &Request, reason: &str) -> Response {
    warn!(
        method = %req.method(),
        path = req.uri().path(),
        reason,
        "request rejected by gate"
    );
    AppError::AccessDenied(INVALID_CREDENTIAL_MESSAGE.to_string()).into_response()
}

/// Extractor for the gate-authenticated user.
pub struct AuthUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| AppError::AccessDenied(INVALID_CREDENTIAL_MESSAGE.to_string()))
    }
}
