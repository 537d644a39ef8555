//! Shared helpers for the integration tests.

#![allow(dead_code)]

use account::{
    api::routes::create_router,
    auth::jwt::{Claims, TokenCodec},
    auth::password::PasswordHasher,
    db::{NewUser, UserStore},
    AccountConfig, AppState, BcryptPasswordHasher, Rs256TokenCodec, TokenKeys, TursoClient,
};
use axum_test::TestServer;
use chrono::Utc;
use std::sync::Arc;

pub const PRIVATE_KEY: &str = include_str!("../fixtures/id_rsa");
pub const PUBLIC_KEY: &str = include_str!("../fixtures/id_rsa.pub");
pub const OTHER_PRIVATE_KEY: &str = include_str!("../fixtures/other_rsa");
pub const OTHER_PUBLIC_KEY: &str = include_str!("../fixtures/other_rsa.pub");

pub const TEST_ISSUER: &str = "account-test";

pub fn test_keys() -> TokenKeys {
    TokenKeys::new(PRIVATE_KEY, PUBLIC_KEY)
}

pub fn test_codec() -> Rs256TokenCodec {
    Rs256TokenCodec::new(Arc::new(test_keys())).expect("fixture keys should parse")
}

/// Codec with a key pair the server does not trust.
pub fn foreign_codec() -> Rs256TokenCodec {
    Rs256TokenCodec::new(Arc::new(TokenKeys::new(OTHER_PRIVATE_KEY, OTHER_PUBLIC_KEY)))
        .expect("fixture keys should parse")
}

pub fn test_config() -> AccountConfig {
    let mut config = AccountConfig::default();
    config.auth.issuer = TEST_ISSUER.to_string();
    config.auth.token_expiry_secs = 3600;
    config.auth.password_cost = 4;
    config.database.url = ":memory:".to_string();
    config
}

/// Signs a token for `user_id` that expires `expires_in` seconds from now.
pub fn token_for(codec: &dyn TokenCodec, user_id: i64, expires_in: i64) -> String {
    codec
        .sign(&Claims {
            issuer: TEST_ISSUER.to_string(),
            expires_at: Utc::now().timestamp() + expires_in,
            user_id,
        })
        .expect("should sign")
}

pub struct TestContext {
    pub server: TestServer,
    pub store: Arc<TursoClient>,
}

impl TestContext {
    /// Inserts a user directly, bypassing registration rules.
    pub async fn seed_user(&self, phone_number: &str, full_name: &str, password: &str) -> i64 {
        let password_hash = BcryptPasswordHasher::with_cost(4)
            .hash(password)
            .expect("should hash");

        self.store
            .insert(NewUser {
                phone_number: phone_number.to_string(),
                full_name: full_name.to_string(),
                password_hash,
            })
            .await
            .expect("should insert user")
    }

    pub async fn login_count(&self, user_id: i64) -> i64 {
        self.store
            .get_by_id(user_id)
            .await
            .expect("should query user")
            .expect("user should exist")
            .login_success_count
    }
}

pub async fn create_test_context() -> TestContext {
    let store = Arc::new(
        TursoClient::new_memory()
            .await
            .expect("Failed to create in-memory database"),
    );

    let state =
        AppState::new(test_config(), store.clone(), test_keys()).expect("state should build");
    let server = TestServer::new(create_router(state)).expect("Failed to create test server");

    TestContext { server, store }
}
