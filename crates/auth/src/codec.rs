//! Credential codec: issues and verifies signed identity tokens (JWT).
//!
//! Only the HMAC family is supported, matching the shared-secret key model.
//! Verification pins the configured algorithm, checks the signature, then
//! decodes a strongly typed [`Claims`] and range-checks it. Callers only ever
//! see [`AuthError::Unauthenticated`]; the specific cause is logged.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{validate_claims, Claims, ClaimsError};
use crate::config::{ConfigError, JwtConfig};
use crate::{AuthError, Identity};

/// Verifies a bearer credential into an [`Identity`].
///
/// Implementations must be pure functions of `(token, now)` so that repeated
/// verification of the same token is idempotent.
pub trait TokenVerifier: Send + Sync {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError>;

    fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now())
    }
}

/// Internal verification failure. Never returned to a remote caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub(crate) enum VerifyError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("algorithm mismatch: expected {expected:?}, found {found:?}")]
    AlgorithmMismatch { expected: Algorithm, found: Algorithm },

    #[error("signature mismatch")]
    BadSignature,

    #[error(transparent)]
    Claims(#[from] ClaimsError),

    #[error("unexpected decode failure: {0}")]
    Internal(String),
}

impl VerifyError {
    fn reason(&self) -> &'static str {
        match self {
            VerifyError::Malformed(_) => "malformed",
            VerifyError::AlgorithmMismatch { .. } => "algorithm_mismatch",
            VerifyError::BadSignature => "bad_signature",
            VerifyError::Claims(ClaimsError::Expired) => "expired",
            VerifyError::Claims(_) => "invalid_claim",
            VerifyError::Internal(_) => "internal",
        }
    }
}

impl From<jsonwebtoken::errors::Error> for VerifyError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => VerifyError::BadSignature,
            ErrorKind::InvalidToken
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => VerifyError::Malformed(err.to_string()),
            _ => VerifyError::Internal(err.to_string()),
        }
    }
}

/// Parse a configured algorithm identifier, accepting only the HMAC family.
pub fn parse_algorithm(raw: &str) -> Result<Algorithm, ConfigError> {
    let unsupported = || ConfigError::UnsupportedAlgorithm(raw.to_string());
    let algorithm = Algorithm::from_str(raw.trim()).map_err(|_| unsupported())?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        _ => Err(unsupported()),
    }
}

/// Issues and verifies tokens with one pinned algorithm and key.
///
/// Immutable after construction; share it behind an `Arc`.
pub struct TokenCodec {
    algorithm: Algorithm,
    duration: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.algorithm)
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Result<Self, ConfigError> {
        let algorithm = parse_algorithm(&config.algorithm)?;
        if config.secret.is_empty() {
            return Err(ConfigError::MissingKey);
        }
        if config.duration == 0 {
            return Err(ConfigError::InvalidDuration(
                "must be at least one minute".to_string(),
            ));
        }

        // Expiry is checked by `validate_claims` against an explicit clock.
        let mut validation = Validation::new(algorithm);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        // A missing `exp` already fails deserialization of the typed `Claims`.
        validation.required_spec_claims = HashSet::new();

        Ok(Self {
            algorithm,
            duration: Duration::minutes(i64::from(config.duration)),
            encoding_key: EncodingKey::from_secret(config.secret.expose()),
            decoding_key: DecodingKey::from_secret(config.secret.expose()),
            validation,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    /// Issue a token that expires at `now + duration`.
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims::for_identity(identity, now + self.duration);
        let token = jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "failed to sign token");
                AuthError::internal(e.to_string())
            })?;

        tracing::debug!(
            user_id = %identity.id,
            tenant_id = %identity.tenant_id,
            role = %identity.role,
            expires_at = claims.exp,
            "issued token"
        );
        Ok(token)
    }

    pub(crate) fn inspect(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, VerifyError> {
        let header = jsonwebtoken::decode_header(token)?;
        if header.alg != self.algorithm {
            return Err(VerifyError::AlgorithmMismatch {
                expected: self.algorithm,
                found: header.alg,
            });
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(validate_claims(data.claims, now)?)
    }
}

impl TokenVerifier for TokenCodec {
    fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        self.inspect(token, now).map_err(|err| {
            match &err {
                VerifyError::Internal(detail) => {
                    tracing::error!(reason = err.reason(), %detail, "token decode failed unexpectedly")
                }
                _ => tracing::debug!(reason = err.reason(), error = %err, "token verification failed"),
            }
            AuthError::Unauthenticated
        })
    }
}
