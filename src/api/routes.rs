use crate::api::handlers::{health, not_found, users};
use crate::auth::middleware::request_gate;
use crate::auth::service::Authenticator;
use crate::AppState;
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the full application router.
///
/// The gate wraps every route (and the fallback), so public access is decided
/// only by the allow-list in [`crate::auth::middleware::PUBLIC_ROUTES`].
pub fn create_router(state: AppState) -> Router {
    let authenticator: Arc<dyn Authenticator> = state.auth_service.clone();

    Router::new()
        .route("/", get(health::health_check))
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/users/me", get(users::get_me))
        .route("/users", put(users::update_me))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(authenticator, request_gate))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
