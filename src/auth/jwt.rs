use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Algorithms accepted on verification. Everything outside the RSA PKCS#1
/// family (`none`, HMAC, ECDSA, PSS, EdDSA) is refused before the signature
/// is looked at.
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// Claims embedded in every login token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "iss")]
    pub issuer: String,
    /// Expiry as a unix timestamp in seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
    #[serde(rename = "UserId")]
    pub user_id: i64,
}

/// What survives verification. Issuer and expiry are checked but not kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedClaims {
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("failed to parse RSA key: {0}")]
    KeyParse(String),

    #[error("failed to sign token: {0}")]
    Signing(String),

    #[error("unexpected signing algorithm")]
    AlgorithmMismatch,

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token has expired")]
    Expired,

    #[error("token is malformed: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                TokenError::KeyParse(err.to_string())
            }
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                TokenError::AlgorithmMismatch
            }
            ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// PEM key material read once at startup and shared read-only afterwards.
#[derive(Clone)]
pub struct TokenKeys {
    private_pem: Vec<u8>,
    public_pem: Vec<u8>,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("private_pem", &"<redacted>")
            .field("public_pem_len", &self.public_pem.len())
            .finish()
    }
}

impl TokenKeys {
    pub fn new(private_pem: impl Into<Vec<u8>>, public_pem: impl Into<Vec<u8>>) -> Self {
        Self {
            private_pem: private_pem.into(),
            public_pem: public_pem.into(),
        }
    }

    /// Reads both PEM files. Called once while the process boots.
    /// Errors name the file that could not be read.
    pub fn from_files(
        private_key_path: impl AsRef<Path>,
        public_key_path: impl AsRef<Path>,
    ) -> std::io::Result<Self> {
        let private_pem = read_key_file(private_key_path.as_ref())?;
        let public_pem = read_key_file(public_key_path.as_ref())?;
        Ok(Self::new(private_pem, public_pem))
    }

    pub fn public_pem(&self) -> &[u8] {
        &self.public_pem
    }
}

fn read_key_file(path: &Path) -> std::io::Result<Vec<u8>> {
    fs::read(path).map_err(|e| std::io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
}

/// Signs and verifies login tokens.
#[cfg_attr(test, automock)]
pub trait TokenCodec: Send + Sync {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError>;

    fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError>;
}

/// RS256 [`TokenCodec`] backed by `jsonwebtoken`.
pub struct Rs256TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Rs256TokenCodec {
    /// Parses the PEM keys up front so a bad key fails startup instead of the first request.
    pub fn new(keys: Arc<TokenKeys>) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_rsa_pem(&keys.private_pem)
            .map_err(|e| TokenError::KeyParse(format!("private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(&keys.public_pem)
            .map_err(|e| TokenError::KeyParse(format!("public key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        // A token is dead from its expiry second onwards.
        validation.reject_tokens_expiring_in_less_than = 1;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
        })
    }
}

impl TokenCodec for Rs256TokenCodec {
    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        debug!(
            user_id = claims.user_id,
            expires_at = claims.expires_at,
            "signing login token"
        );

        encode(&Header::new(Algorithm::RS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;

        debug!(user_id = data.claims.user_id, "verified login token");

        Ok(VerifiedClaims {
            user_id: data.claims.user_id,
        })
    }
}
