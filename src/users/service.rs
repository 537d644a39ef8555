use crate::auth::password::{PasswordError, PasswordHasher, MAX_PASSWORD_BYTES};
use crate::db::traits::{NewUser, UpdateUser, UserStore};
use crate::types::{
    AppError, RegisterRequest, Result, UpdateUserRequest, UserProfile, ValidationErrors,
};
use crate::users::forms;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    Invalid(ValidationErrors),
    Registered(UserProfile),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Invalid(ValidationErrors),
    /// The requested phone number belongs to someone else.
    Conflict,
    Updated(UserProfile),
}

/// Registration, profile reads and profile updates.
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { store, hasher }
    }

    pub async fn register(&self, form: RegisterRequest) -> Result<RegisterOutcome> {
        let errors = forms::validate_register(&form);
        if !errors.is_empty() {
            return Ok(RegisterOutcome::Invalid(errors));
        }

        if self
            .store
            .get_by_phone_number(&form.phone_number)
            .await?
            .is_some()
        {
            return Ok(RegisterOutcome::Invalid(ValidationErrors::single(
                "phone_number",
                format!(
                    "Phone number {} is unavailable for registering new user",
                    form.phone_number
                ),
            )));
        }

        let password_hash = match self.hasher.hash(&form.password) {
            Ok(hash) => hash,
            Err(PasswordError::TooLong(_)) => {
                return Ok(RegisterOutcome::Invalid(ValidationErrors::single(
                    "password",
                    format!("Password must have maximum {} bytes long", MAX_PASSWORD_BYTES),
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let id = self
            .store
            .insert(NewUser {
                phone_number: form.phone_number,
                full_name: form.full_name,
                password_hash,
            })
            .await?;

        let profile = self.require_profile(id).await?;
        info!(user_id = id, "user registered");

        Ok(RegisterOutcome::Registered(profile))
    }

    /// Applies the non-empty fields of `form` to user `user_id`.
    pub async fn update(&self, user_id: i64, form: UpdateUserRequest) -> Result<UpdateOutcome> {
        let errors = forms::validate_update(&form);
        if !errors.is_empty() {
            return Ok(UpdateOutcome::Invalid(errors));
        }

        if !form.phone_number.is_empty() {
            if let Some(owner) = self.store.get_by_phone_number(&form.phone_number).await? {
                if owner.id != user_id {
                    return Ok(UpdateOutcome::Conflict);
                }
            }
        }

        let current = self
            .store
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let mut changes = UpdateUser {
            id: current.id,
            phone_number: current.phone_number,
            full_name: current.full_name,
            login_success_count: current.login_success_count,
        };
        if !form.phone_number.is_empty() {
            changes.phone_number = form.phone_number;
        }
        if !form.full_name.is_empty() {
            changes.full_name = form.full_name;
        }

        if !self.store.update(changes).await? {
            return Err(AppError::Database(format!(
                "update of user {} matched no row",
                user_id
            )));
        }

        let profile = self.require_profile(user_id).await?;
        info!(user_id, "user profile updated");

        Ok(UpdateOutcome::Updated(profile))
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<UserProfile>> {
        let user = self.store.get_by_id(id).await?;
        Ok(user.as_ref().map(UserProfile::from))
    }

    pub async fn get_by_phone_number(&self, phone_number: &str) -> Result<Option<UserProfile>> {
        let user = self.store.get_by_phone_number(phone_number).await?;
        Ok(user.as_ref().map(UserProfile::from))
    }

    async fn require_profile(&self, id: i64) -> Result<UserProfile> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| AppError::Database(format!("user {} missing after write", id)))
    }
}
