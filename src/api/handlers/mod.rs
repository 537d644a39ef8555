//! API request handlers.

/// Liveness endpoint.
pub mod health;
/// Registration, login and profile handlers.
pub mod users;

use crate::types::AppError;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::DeserializeOwned;

/// `Json` extractor whose rejection is a plain 400 `"Bad Request"`.
pub struct ValidJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "rejected request body");
                Err(AppError::InvalidInput("Bad Request".to_string()))
            }
        }
    }
}

pub async fn not_found() -> AppError {
    AppError::NotFound("Not Found".to_string())
}
