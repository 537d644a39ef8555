use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// bcrypt work factor used for stored credentials.
pub const DEFAULT_COST: u32 = 10;

/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password is {0} bytes, the maximum is {MAX_PASSWORD_BYTES}")]
    TooLong(usize),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),

    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// One-way password hashing.
#[cfg_attr(test, automock)]
pub trait PasswordHasher: Send + Sync {
    /// Hashes `password` with a fresh salt.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Checks `password` against a stored hash in constant time.
    fn verify(&self, hash: &str, password: &str) -> Result<bool, PasswordError>;
}

/// bcrypt-backed [`PasswordHasher`].
#[derive(Debug, Clone)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl BcryptPasswordHasher {
    pub fn new() -> Self {
        Self { cost: DEFAULT_COST }
    }

    /// Uses a custom work factor. Costs outside bcrypt's 4..=31 range fail at hash time.
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong(password.len()));
        }

        debug!(cost = self.cost, "hashing password");
        bcrypt::hash(password, self.cost).map_err(|e| PasswordError::Hashing(e.to_string()))
    }

    fn verify(&self, hash: &str, password: &str) -> Result<bool, PasswordError> {
        // Nothing longer than the limit was ever hashed here, so it cannot match.
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        bcrypt::verify(password, hash).map_err(|e| PasswordError::MalformedHash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> BcryptPasswordHasher {
        BcryptPasswordHasher::with_cost(4)
    }

    #[test]
    fn test_default_cost_is_ten() {
        assert_eq!(BcryptPasswordHasher::new().cost(), 10);
    }

    #[test]
    fn test_password_hashing() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Asdasd123#").expect("should hash password");

        assert_ne!(hash, "Asdasd123#");
        assert!(hash.starts_with("$2"), "hash should be in modular crypt format");
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let hasher = fast_hasher();
        let first = hasher.hash("Asdasd123#").unwrap();
        let second = hasher.hash("Asdasd123#").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify(&first, "Asdasd123#").unwrap());
        assert!(hasher.verify(&second, "Asdasd123#").unwrap());
    }

    #[test]
    fn test_known_hash_verifies() {
        let hasher = BcryptPasswordHasher::new();
        let stored = "$2a$10$3CnCHHqLsCb9R7.WEiG7yOwIyQdFtComVcNsOoM9Ns5mb/L03if0i";

        assert!(hasher.verify(stored, "Asdasd123#").unwrap());
        assert!(!hasher.verify(stored, "Asdasd125#").unwrap());
    }

    #[test]
    fn test_password_verification_failure() {
        let hasher = fast_hasher();
        let hash = hasher.hash("correct_password").unwrap();

        assert!(!hasher.verify(&hash, "wrong_password").unwrap());
        assert!(!hasher.verify(&hash, "").unwrap());
    }

    #[test]
    fn test_too_long_password_is_rejected_not_truncated() {
        let hasher = fast_hasher();
        let long = "A".repeat(MAX_PASSWORD_BYTES + 1);

        match hasher.hash(&long) {
            Err(PasswordError::TooLong(len)) => assert_eq!(len, 73),
            other => panic!("expected TooLong, got {other:?}"),
        }

        let at_limit = "A".repeat(MAX_PASSWORD_BYTES);
        let hash = hasher.hash(&at_limit).expect("72 bytes is allowed");
        assert!(!hasher.verify(&hash, &long).unwrap());
    }

    #[test]
    fn test_multibyte_length_counts_bytes() {
        let hasher = fast_hasher();
        // 37 two-byte characters
        let password = "é".repeat(37);

        assert!(matches!(
            hasher.hash(&password),
            Err(PasswordError::TooLong(74))
        ));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let hasher = fast_hasher();

        assert!(matches!(
            hasher.verify("not-a-bcrypt-hash", "whatever"),
            Err(PasswordError::MalformedHash(_))
        ));
    }
}
