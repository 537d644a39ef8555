//! Storage abstraction for user accounts.
//!
//! Services only see [`UserStore`]; the concrete backend is chosen from the
//! configured database URL through [`DatabaseProvider`].
//!
//! # Example
//!
//! ```rust,ignore
//! use account::db::DatabaseProvider;
//!
//! // In-memory database (tests, local experiments)
//! let store = DatabaseProvider::Memory.create_store().await?;
//!
//! // File-backed SQLite
//! let store = DatabaseProvider::from_url("./data/account.db").create_store().await?;
//! ```

use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;

#[cfg(test)]
use mockall::automock;

/// Database provider configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DatabaseProvider {
    /// In-memory SQLite database (ephemeral, lost on restart)
    #[default]
    Memory,
    /// File-based SQLite database
    SQLite {
        /// Path to the SQLite database file
        path: String,
    },
}

impl DatabaseProvider {
    /// `""` and `":memory:"` select the in-memory backend, anything else is a file path.
    pub fn from_url(url: &str) -> Self {
        let url = url.trim();
        if url.is_empty() || url == ":memory:" {
            DatabaseProvider::Memory
        } else {
            DatabaseProvider::SQLite {
                path: url.to_string(),
            }
        }
    }

    /// Opens the backend and makes sure the schema exists.
    pub async fn create_store(&self) -> Result<Arc<dyn UserStore>> {
        match self {
            DatabaseProvider::Memory => {
                let client = super::turso::TursoClient::new_memory().await?;
                Ok(Arc::new(client))
            }
            DatabaseProvider::SQLite { path } => {
                let client = super::turso::TursoClient::new_local(path).await?;
                Ok(Arc::new(client))
            }
        }
    }
}

/// A user row, password hash included. Never serialized to clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredIdentity {
    pub id: i64,
    pub phone_number: String,
    pub full_name: String,
    pub password_hash: String,
    pub login_success_count: i64,
    /// Unix timestamp of creation
    pub created_at: i64,
    /// Unix timestamp of last update
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub phone_number: String,
    pub full_name: String,
    pub password_hash: String,
}

/// Full replacement of the mutable columns of one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUser {
    pub id: i64,
    pub phone_number: String,
    pub full_name: String,
    pub login_success_count: i64,
}

/// Persistence operations needed by the account and authentication services.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Option<StoredIdentity>>;

    async fn get_by_phone_number(&self, phone_number: &str) -> Result<Option<StoredIdentity>>;

    /// Inserts a user and returns the generated id.
    /// A taken phone number surfaces as [`crate::types::AppError::Conflict`].
    async fn insert(&self, user: NewUser) -> Result<i64>;

    /// Returns `false` when no row matched `user.id`.
    async fn update(&self, user: UpdateUser) -> Result<bool>;
}
