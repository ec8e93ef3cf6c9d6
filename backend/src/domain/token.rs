//! Stateless session tokens.
//!
//! Tokens are self-contained HS256 JWTs binding a user id and role to a
//! fixed-TTL validity window. Verification is a pure computation against the
//! process-wide signing secret injected at startup; there is no server-side
//! session store and no revocation list, so a token stays valid until its
//! `exp` claim passes.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::auth::CallerContext;
use super::user::{Role, User, UserId};
use super::Error;

/// Default token lifetime.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Signing secret and token lifetime, injected at startup.
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    ttl: Duration,
}

impl TokenConfig {
    /// Build a configuration with an explicit lifetime.
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Build a configuration with the default 24 hour lifetime.
    pub fn with_default_ttl(secret: impl Into<String>) -> Self {
        Self::new(secret, Duration::hours(DEFAULT_TTL_HOURS))
    }
}

/// Rejection reasons returned by [`TokenIssuer::verify`].
///
/// Inbound adapters surface all three uniformly as an access-denial response;
/// the distinction exists for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Current time is at or past the token's `exp` claim.
    #[error("token has expired")]
    Expired,
    /// Signature does not match the process signing secret.
    #[error("token signature is invalid")]
    InvalidSignature,
    /// Token could not be parsed or carries unusable claims.
    #[error("token is malformed: {message}")]
    Malformed { message: String },
}

impl TokenError {
    fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    role: Role,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Build an issuer from the injected configuration.
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.ttl,
        }
    }

    /// Mint a token for a persisted user, valid for the configured TTL.
    pub fn issue(&self, user: &User) -> Result<String, Error> {
        self.issue_at(user.id(), user.role(), Utc::now())
    }

    fn issue_at(
        &self,
        subject: &UserId,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, Error> {
        let claims = Claims {
            sub: *subject.as_uuid(),
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| Error::internal(format!("token signing failed: {err}")))
    }

    /// Verify a presented token and recover the caller identity.
    pub fn verify(&self, token: &str) -> Result<CallerContext, TokenError> {
        // Zero leeway: a token issued at T is accepted on [T, T+TTL) exactly.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                other => TokenError::malformed(format!("{other:?}")),
            })?;

        // The decoder still accepts `exp == now`; the window is half-open, so
        // the expiry instant itself must be rejected.
        if Utc::now().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(CallerContext::new(
            UserId::from_uuid(data.claims.sub),
            data.claims.role,
        ))
    }
}
