/// Signed session tokens
///
/// Tokens are HS256 JWTs carrying the authenticated user's ID. A
/// [`TokenIssuer`] is built once at startup from [`TokenConfig`] and shared by
/// the login handler (issuing) and the access-control middleware (verifying).
///
/// # Claims
///
/// ```json
/// { "userId": "6f1c0a4e-...", "iat": 1714560000, "exp": 1714646400 }
/// ```
///
/// `exp` is only present when an expiry is configured. Without it tokens stay
/// valid for as long as the signing secret does.
///
/// # Secret rotation
///
/// New tokens are always signed with `secret`. Verification also accepts
/// tokens signed with any of `previous_secrets`, so a secret can be rotated
/// without logging every user out at once.
///
/// # Example
///
/// ```
/// use tickbox_shared::auth::jwt::{TokenConfig, TokenIssuer};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = TokenIssuer::new(&TokenConfig::new("a-secret-key-that-is-at-least-32-bytes"));
/// let user_id = Uuid::new_v4();
///
/// let token = issuer.issue(user_id)?;
/// assert_eq!(issuer.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// No token was supplied
    #[error("Token is missing")]
    Missing,

    /// Token is not a well-formed JWT
    #[error("Invalid token format: {0}")]
    Malformed(String),

    /// Signature does not match any known secret
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token has expired
    #[error("Token has expired")]
    Expired,
}

/// Token issuer configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Secret used to sign new tokens
    pub secret: String,

    /// Retired secrets still accepted for verification
    pub previous_secrets: Vec<String>,

    /// Token lifetime (None = tokens never expire)
    pub expires_in: Option<Duration>,
}

impl TokenConfig {
    /// Config with a single secret and no expiry
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            previous_secrets: Vec::new(),
            expires_in: None,
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// Authenticated user
    pub user_id: Uuid,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Creates claims for `user_id`, expiring after `expires_in` if given
    pub fn new(user_id: Uuid, expires_in: Option<Duration>) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            iat: now.timestamp(),
            exp: expires_in.map(|d| (now + d).timestamp()),
        }
    }
}

/// Issues and verifies signed tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_keys: Vec<DecodingKey>,
    expires_in: Option<Duration>,
}

impl TokenIssuer {
    /// Builds an issuer from configuration
    pub fn new(config: &TokenConfig) -> Self {
        let decoding_keys = std::iter::once(&config.secret)
            .chain(config.previous_secrets.iter())
            .map(|secret| DecodingKey::from_secret(secret.as_bytes()))
            .collect();

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_keys,
            expires_in: config.expires_in,
        }
    }

    /// Issues a token for `user_id`
    ///
    /// # Errors
    ///
    /// Returns `TokenError::CreateError` if encoding fails
    pub fn issue(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.sign(&Claims::new(user_id, self.expires_in))
    }

    /// Signs arbitrary claims with the current secret
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns the user ID it was issued for
    ///
    /// # Errors
    ///
    /// - `TokenError::Missing` for an empty token
    /// - `TokenError::Malformed` if the token cannot be decoded
    /// - `TokenError::InvalidSignature` if no known secret matches
    /// - `TokenError::Expired` if the token carries an elapsed `exp`
    pub fn verify(&self, token: &str) -> Result<Uuid, TokenError> {
        self.verify_claims(token).map(|claims| claims.user_id)
    }

    /// Verifies a token and returns its full claims
    pub fn verify_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let validation = Self::validation();

        for key in &self.decoding_keys {
            match decode::<Claims>(token, key, &validation) {
                Ok(data) => return Ok(data.claims),
                Err(e) => match e.kind() {
                    ErrorKind::InvalidSignature => continue,
                    ErrorKind::ExpiredSignature => return Err(TokenError::Expired),
                    _ => return Err(TokenError::Malformed(e.to_string())),
                },
            }
        }

        Err(TokenError::InvalidSignature)
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // `exp` is optional; when present it is enforced
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.leeway = 0;
        validation
    }
}
