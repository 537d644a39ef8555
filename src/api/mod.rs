//! HTTP API Handlers and Routes
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Router configuration and the global gate
//!
//! # API Endpoints
//!
//! - `GET /` - Health check (public)
//! - `POST /users/register` - Register new user (public)
//! - `POST /users/login` - Login and receive an RS256 token (public)
//! - `GET /users/me` - Profile of the caller
//! - `PUT /users` - Update phone number and/or full name of the caller
//!
//! # Authentication
//!
//! Everything that is not public requires a token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//! Requests without a valid token get `403 {"error": "Your request is made with invalid credential"}`.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;

use crate::types::{
    AuthenticationCredential, LoginRequest, RegisterRequest, UpdateUserRequest, UserProfile,
    ValidationErrors,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// OpenAPI document for the account API.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::users::register,
        handlers::users::login,
        handlers::users::get_me,
        handlers::users::update_me,
    ),
    components(schemas(
        LoginRequest,
        RegisterRequest,
        UpdateUserRequest,
        AuthenticationCredential,
        UserProfile,
        ValidationErrors,
    )),
    modifiers(&BearerSecurity),
    tags(
        (name = "users", description = "Registration, login and profile management"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in ["/", "/users/register", "/users/login", "/users/me", "/users"] {
            assert!(paths.contains(&expected), "missing {expected}");
        }
    }
}
