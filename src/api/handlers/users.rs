use crate::{
    auth::middleware::AuthUser,
    auth::service::{AuthenticationOutcome, Authenticator},
    types::{
        AppError, AuthenticationCredential, LoginRequest, RegisterRequest, Result,
        UpdateUserRequest, UserProfile,
    },
    users::{RegisterOutcome, UpdateOutcome},
    AppState,
};
use axum::{extract::State, Json};

use super::ValidJson;

/// Shown for both an unknown phone number and a wrong password.
pub const LOGIN_FAILED_MESSAGE: &str =
    "Login failed. Please enter correct phone number and password.";

/// Register a new user
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = UserProfile),
        (status = 400, description = "Validation failed, body maps field to message")
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RegisterRequest>,
) -> Result<Json<UserProfile>> {
    match state.user_service.register(payload).await? {
        RegisterOutcome::Registered(profile) => Ok(Json(profile)),
        RegisterOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
    }
}

/// Login with phone number and password
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthenticationCredential),
        (status = 400, description = "Validation failed or credentials rejected")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<LoginRequest>,
) -> Result<Json<AuthenticationCredential>> {
    match state.auth_service.authenticate(payload).await? {
        AuthenticationOutcome::Authenticated(credential) => Ok(Json(credential)),
        AuthenticationOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
        AuthenticationOutcome::UserNotFound | AuthenticationOutcome::WrongPassword => {
            Err(AppError::LoginFailed(LOGIN_FAILED_MESSAGE.to_string()))
        }
    }
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 403, description = "Missing or invalid token"),
        (status = 404, description = "User not found")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<UserProfile>> {
    state
        .user_service
        .get_by_id(user.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Update phone number and/or full name of the authenticated user
#[utoipa::path(
    put,
    path = "/users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Missing or invalid token"),
        (status = 409, description = "Phone number belongs to another user")
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(payload): ValidJson<UpdateUserRequest>,
) -> Result<Json<UserProfile>> {
    match state.user_service.update(user.user_id, payload).await? {
        UpdateOutcome::Updated(profile) => Ok(Json(profile)),
        UpdateOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
        UpdateOutcome::Conflict => Err(AppError::Conflict("Conflicted".to_string())),
    }
}
