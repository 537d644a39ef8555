//! # account-server
//!
//! User account service: registration, profile management, RS256 bearer-token
//! login and a global request gate, built on axum and libsql.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `account-server` binary
//! 2. **As a library** - Embed the authentication core in another axum service
//!
//! ### Library Usage
//!
//! ```rust,ignore
//! use account::{api::routes::create_router, AccountConfig, AppState, DatabaseProvider};
//!
//! let config = AccountConfig::load("account.toml")?;
//! let store = DatabaseProvider::from_url(&config.database.url).create_store().await?;
//! let keys = config.load_token_keys()?;
//!
//! let state = AppState::new(config, store, keys)?;
//! let app = create_router(state);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST handlers, router and OpenAPI document
//! - [`auth`] - Password hashing, token codec, authentication engine and request gate
//! - [`db`] - User storage (libsql)
//! - [`users`] - Registration, profile reads and updates, form validation
//! - [`types`] - Request/response types and error handling
//! - [`utils`] - TOML configuration

/// HTTP API handlers and routes.
pub mod api;
/// Authentication core and request gate.
pub mod auth;
/// Command line interface.
pub mod cli;
/// User storage.
pub mod db;
/// Core types (requests, responses, errors).
pub mod types;
/// Account management.
pub mod users;
/// Configuration utilities.
pub mod utils;

// Re-export commonly used types
pub use auth::{AuthService, Authenticator, BcryptPasswordHasher, Rs256TokenCodec, TokenKeys};
pub use db::{DatabaseProvider, TursoClient, UserStore};
pub use types::{AppError, Result};
pub use users::UserService;
pub use utils::toml_config::AccountConfig;

use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Resolved configuration
    pub config: Arc<AccountConfig>,
    /// Login and token authorization
    pub auth_service: Arc<AuthService>,
    /// Registration and profile management
    pub user_service: Arc<UserService>,
}

impl AppState {
    /// Wires the services together. Fails when the key material does not parse.
    pub fn new(
        config: AccountConfig,
        store: Arc<dyn UserStore>,
        keys: TokenKeys,
    ) -> Result<Self> {
        let hasher = Arc::new(BcryptPasswordHasher::with_cost(config.auth.password_cost));
        let codec = Arc::new(Rs256TokenCodec::new(Arc::new(keys))?);

        let auth_service = AuthService::new(
            store.clone(),
            hasher.clone(),
            codec,
            config.auth.issuer.clone(),
            config.auth.token_expiry_secs,
        );
        let user_service = UserService::new(store, hasher);

        Ok(Self {
            config: Arc::new(config),
            auth_service: Arc::new(auth_service),
            user_service: Arc::new(user_service),
        })
    }
}
