//! Authentication core
//!
//! Credential checks, token issuance and the request gate for the account API.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - bcrypt password hashing
//! - [`auth::jwt`](crate::auth::jwt) - RS256 token signing and verification
//! - [`auth::service`](crate::auth::service) - login orchestration and token authorization
//! - [`auth::middleware`](crate::auth::middleware) - the global request gate and extractor
//!
//! # Security Features
//!
//! - **Password Hashing**: bcrypt, cost 10, inputs over 72 bytes refused
//! - **Tokens**: RS256 signed, only the RSA PKCS#1 family accepted on verify, no leeway
//! - **Claims**: `iss`, `exp` and `UserId`; only the user id is handed back after verification
//!
//! # Usage
//!
//! ```ignore
//! use account::auth::{AuthService, Authenticator};
//!
//! let outcome = auth_service.authenticate(LoginRequest { phone_number, password }).await?;
//! if let AuthenticationOutcome::Authenticated(credential) = outcome {
//!     println!("token: {}", credential.token);
//! }
//! ```
//!
//! Every route except the ones in
//! [`PUBLIC_ROUTES`](crate::auth::middleware::PUBLIC_ROUTES) goes through
//! [`request_gate`](crate::auth::middleware::request_gate), which puts an
//! [`AuthenticatedUser`](crate::auth::middleware::AuthenticatedUser) into the
//! request extensions.

/// RS256 token codec, claims and key material.
pub mod jwt;
/// Request gate and authenticated-user extractor.
pub mod middleware;
/// bcrypt password hashing.
pub mod password;
/// Login flow and token authorization.
pub mod service;

pub use jwt::{Claims, Rs256TokenCodec, TokenCodec, TokenError, TokenKeys, VerifiedClaims};
pub use middleware::{AuthUser, AuthenticatedUser};
pub use password::{BcryptPasswordHasher, PasswordError, PasswordHasher};
pub use service::{AuthService, AuthenticationOutcome, Authenticator, AuthorizationResult};
