//! Configuration utilities.

/// `account.toml` loading, environment overrides and validation.
pub mod toml_config;
