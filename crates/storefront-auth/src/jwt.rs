//! JWT token management

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use storefront_db::User;
use tracing::debug;

use crate::error::AuthError;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 120;

/// Longest lifetime a configuration may ask for (one year)
pub const MAX_TOKEN_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user external id)
    pub sub: String,
    /// User role at the time of issue
    pub role: String,
    /// Expiration time (Unix timestamp, whole seconds)
    pub exp: i64,
    /// Sub-second part of the expiration time
    #[serde(default)]
    pub exp_nanos: u32,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// JWT manager for token generation and validation
///
/// The signing secret is fixed for the lifetime of the manager.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str, token_ttl: Duration) -> Self {
        // Expiry is checked against the caller's clock in `verify`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            token_ttl,
        }
    }

    /// Configured token lifetime
    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    /// Issue a token for `user`, valid until `now + ttl`
    pub fn issue(&self, user: &User, now: DateTime<Utc>, ttl: Duration) -> Result<String, AuthError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Signing(format!("token lifetime {} out of range", ttl)))?;

        let claims = Claims {
            sub: user.uuid.clone(),
            role: user.user_type.clone(),
            exp: expires_at.timestamp(),
            exp_nanos: expires_at.timestamp_subsec_nanos(),
            iat: now.timestamp(),
        };

        debug!("Issuing token for user {} ({})", user.name, claims.role);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Issue a token with the configured lifetime
    pub fn generate_token(&self, user: &User, now: DateTime<Utc>) -> Result<String, AuthError> {
        self.issue(user, now, self.token_ttl)
    }

    /// Validate a token's signature and expiry and return its claims
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(classify)?;

        // A token whose expiry does not map to an instant is treated as expired
        let expired = token_data
            .claims
            .expires_at()
            .is_none_or(|expires_at| now >= expires_at);
        if expired {
            return Err(AuthError::Expired);
        }

        Ok(token_data.claims)
    }
}

impl Claims {
    /// Full-precision expiry instant
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, self.exp_nanos).single()
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Malformed(err.to_string()),
    }
}
