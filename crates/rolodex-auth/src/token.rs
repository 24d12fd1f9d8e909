//! Bearer token issuance and validation
//!
//! Tokens are compact HS256 JWS strings (`header.payload.signature`). They are
//! never stored: every validation recomputes the signature from the secret
//! the service was constructed with and then checks the expiry claim.
//!
//! A token moves from *issued* to *expired* once `exp` is reached. Any input
//! that does not decode, carries the wrong algorithm or issuer, or lacks a
//! subject is *malformed*. A well-formed token whose signature does not match
//! is rejected before its expiry is even looked at.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use rolodex_core::AuthConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by every access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Token issuer
    pub iss: String,
    /// Subject - the username
    pub sub: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

/// Identity recovered from a valid token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedIdentity {
    pub username: String,
}

/// An issued token with its validity window
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SignedToken {
    /// Seconds from issuance to expiry
    pub fn expires_in(&self) -> i64 {
        (self.expires_at - self.issued_at).num_seconds()
    }
}

/// Token issuance and validation errors
///
/// The three validation failures are kept apart for logs only; callers must
/// answer all of them with the same authentication failure.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Token signature mismatch")]
    SignatureMismatch,

    #[error("Token has expired")]
    Expired,

    #[error("Token subject must not be empty")]
    EmptySubject,

    #[error("Token lifetime must be a positive whole number of seconds")]
    InvalidTtl,

    #[error("Failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl TokenError {
    /// Short machine-readable reason, used in audit records
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed",
            TokenError::SignatureMismatch => "signature_mismatch",
            TokenError::Expired => "expired",
            TokenError::EmptySubject => "empty_subject",
            TokenError::InvalidTtl => "invalid_ttl",
            TokenError::Signing(_) => "signing_failed",
        }
    }
}

/// Token service settings
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret
    pub secret: String,
    /// Lifetime used by [`TokenService::issue_access_token`]
    pub ttl: Duration,
    /// Issuer written into and required from tokens
    pub issuer: String,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::from(&AuthConfig::default())
    }
}

impl From<&AuthConfig> for TokenConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            secret: config.signing_secret.clone(),
            // Out-of-range lifetimes become zero, which issuance rejects
            ttl: i64::try_from(config.token_ttl_minutes)
                .ok()
                .and_then(Duration::try_minutes)
                .unwrap_or_else(Duration::zero),
            issuer: config.issuer.clone(),
        }
    }
}

/// Issues and validates signed, expiring identity tokens
///
/// Keys are derived once in [`TokenService::new`] and only read afterwards,
/// so one instance can be shared across request tasks.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    issuer: String,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            ttl: config.ttl,
            issuer: config.issuer,
        }
    }

    /// Configured default lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token with the configured lifetime
    pub fn issue_access_token(&self, subject: &str) -> Result<SignedToken, TokenError> {
        self.issue(subject, self.ttl)
    }

    /// Issue a token for `subject` valid for `ttl` from now
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<SignedToken, TokenError> {
        self.issue_at(subject, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`
    ///
    /// Claims carry whole seconds, so `ttl` must be at least one second and
    /// have no sub-second part. `now` is truncated to the second before the
    /// lifetime is added.
    pub fn issue_at(
        &self,
        subject: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<SignedToken, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }
        if ttl < Duration::seconds(1) || ttl.subsec_nanos() != 0 {
            return Err(TokenError::InvalidTtl);
        }

        let iat = now.timestamp();
        let exp = iat
            .checked_add(ttl.num_seconds())
            .ok_or(TokenError::InvalidTtl)?;
        let expires_at = DateTime::from_timestamp(exp, 0).ok_or(TokenError::InvalidTtl)?;

        let claims = Claims {
            iss: self.issuer.clone(),
            sub: subject.to_string(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(SignedToken {
            token,
            issued_at: DateTime::from_timestamp(iat, 0).unwrap_or(now),
            expires_at,
        })
    }

    /// Validate a token against the current time
    pub fn validate(&self, token: &str) -> Result<AuthenticatedIdentity, TokenError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as if the current time were `now`
    pub fn validate_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthenticatedIdentity, TokenError> {
        let claims = self.decode_claims(token)?;

        if now.timestamp() >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(AuthenticatedIdentity {
            username: claims.sub,
        })
    }

    /// Verify the signature and decode claims without checking expiry
    pub fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Expiry is checked by the caller against an explicit clock
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::SignatureMismatch,
                _ => TokenError::Malformed,
            },
        )?;

        if token_data.claims.sub.is_empty() {
            return Err(TokenError::Malformed);
        }

        Ok(token_data.claims)
    }
}
