use crate::auth::jwt::{Claims, TokenCodec};
use crate::auth::password::PasswordHasher;
use crate::db::traits::{UpdateUser, UserStore};
use crate::types::{AppError, AuthenticationCredential, LoginRequest, Result, ValidationErrors};
use crate::users::forms;
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[cfg(test)]
use mockall::automock;

/// Result of a login attempt that did not hit an infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    /// The request itself was malformed; nothing was looked up.
    Invalid(ValidationErrors),
    /// No user has this phone number.
    UserNotFound,
    /// The user exists but the password did not match.
    WrongPassword,
    /// Token issued and login counter persisted.
    Authenticated(AuthenticationCredential),
}

impl AuthenticationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_user_not_found(&self) -> bool {
        matches!(self, Self::UserNotFound)
    }

    pub fn has_validation_errors(&self) -> bool {
        matches!(self, Self::Invalid(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthorizationResult {
    pub is_authorized: bool,
    pub user_id: i64,
}

/// Login and token checks as seen by handlers and the request gate.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, credentials: LoginRequest) -> Result<AuthenticationOutcome>;

    /// Any error means the request must be rejected.
    fn authorize(&self, token: &str) -> Result<AuthorizationResult>;
}

/// Orchestrates credential checks, token issuance and the login counter.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
    codec: Arc<dyn TokenCodec>,
    issuer: String,
    token_ttl_secs: i64,
}

impl AuthService {
    /// # Arguments
    /// * `issuer` - value of the `iss` claim on issued tokens
    /// * `token_ttl_secs` - token validity in seconds
    pub fn new(
        store: Arc<dyn UserStore>,
        hasher: Arc<dyn PasswordHasher>,
        codec: Arc<dyn TokenCodec>,
        issuer: impl Into<String>,
        token_ttl_secs: i64,
    ) -> Self {
        Self {
            store,
            hasher,
            codec,
            issuer: issuer.into(),
            token_ttl_secs,
        }
    }
}

#[async_trait]
impl Authenticator for AuthService {
    async fn authenticate(&self, credentials: LoginRequest) -> Result<AuthenticationOutcome> {
        let errors = forms::validate_login(&credentials);
        if !errors.is_empty() {
            return Ok(AuthenticationOutcome::Invalid(errors));
        }

        let Some(mut user) = self
            .store
            .get_by_phone_number(&credentials.phone_number)
            .await?
        else {
            warn!("login attempt for unknown phone number");
            return Ok(AuthenticationOutcome::UserNotFound);
        };

        let matched = self
            .hasher
            .verify(&user.password_hash, &credentials.password)
            .unwrap_or_else(|e| {
                error!(user_id = user.id, error = %e, "stored password hash is unreadable");
                false
            });
        if !matched {
            warn!(user_id = user.id, "login attempt with wrong password");
            return Ok(AuthenticationOutcome::WrongPassword);
        }

        let expires_at = Duration::try_seconds(self.token_ttl_secs)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "token lifetime of {}s is out of range",
                    self.token_ttl_secs
                ))
            })?;
        let token = self.codec.sign(&Claims {
            issuer: self.issuer.clone(),
            expires_at: expires_at.timestamp(),
            user_id: user.id,
        })?;

        user.login_success_count += 1;

        let updated = self
            .store
            .update(UpdateUser {
                id: user.id,
                phone_number: user.phone_number.clone(),
                full_name: user.full_name.clone(),
                login_success_count: user.login_success_count,
            })
            .await?;

        if !updated {
            return Err(AppError::Database(format!(
                "login counter for user {} was not persisted",
                user.id
            )));
        }

        info!(
            user_id = user.id,
            login_success_count = user.login_success_count,
            "login successful"
        );

        Ok(AuthenticationOutcome::Authenticated(
            AuthenticationCredential {
                token,
                user_id: user.id,
            },
        ))
    }

    fn authorize(&self, token: &str) -> Result<AuthorizationResult> {
        let claims = self.codec.verify(token)?;

        debug!(user_id = claims.user_id, "request authorized");

        Ok(AuthorizationResult {
            is_authorized: true,
            user_id: claims.user_id,
        })
    }
}
