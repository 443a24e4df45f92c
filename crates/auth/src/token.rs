//! Signed session tokens (HS256 JWT).
//!
//! The codec owns the key material and the validity window. Three read paths
//! exist on purpose:
//!
//! * [`TokenCodec::verify`] — boolean liveness check, strict expiry, never
//!   panics, never errors.
//! * [`TokenCodec::claims`] — decodes the claim set even for *expired* tokens
//!   (the refresh path needs the identity out of a stale token); only a bad
//!   signature or garbled payload fails.
//! * [`TokenCodec::refresh`] — re-issues a token carrying the same identity,
//!   refusing tokens older than the refresh window.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use posthub_core::IamError;

use crate::claims::SessionClaims;
use crate::principal::Principal;

/// An expired token may still be refreshed for this many validity windows
/// past its expiry.
pub const REFRESH_WINDOW_FACTOR: i64 = 2;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Malformed,
    #[error("Token is too old to refresh")]
    TooOldToRefresh,
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}

impl From<TokenError> for IamError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired | TokenError::Malformed => IamError::TokenMalformed,
            TokenError::TooOldToRefresh => IamError::TooOldToRefresh,
            TokenError::InvalidKey(msg) => IamError::store(msg),
        }
    }
}

/// Stateless issuer/verifier for session tokens.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validity: Duration,
    refresh_window_factor: i64,
}

impl TokenCodec {
    /// Build a codec from a base64-encoded HMAC secret.
    ///
    /// The secret is decoded before use so that key strength is controlled by
    /// the decoded byte length, not the length of its textual form.
    pub fn new(secret_base64: &str, validity: Duration) -> Result<Self, TokenError> {
        let key = BASE64
            .decode(secret_base64.trim())
            .map_err(|e| TokenError::InvalidKey(e.to_string()))?;
        Ok(Self {
            encoding: EncodingKey::from_secret(&key),
            decoding: DecodingKey::from_secret(&key),
            validity,
            refresh_window_factor: REFRESH_WINDOW_FACTOR,
        })
    }

    /// Override the refresh window multiplier.
    pub fn with_refresh_window_factor(mut self, factor: i64) -> Self {
        self.refresh_window_factor = factor;
        self
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Issue a fresh token for the principal, valid from now.
    pub fn issue(&self, principal: &Principal) -> Result<String, TokenError> {
        self.issue_at(principal, Utc::now())
    }

    fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = SessionClaims::for_principal(principal, now, self.validity);
        self.sign(&claims)
    }

    fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|_| TokenError::Malformed)
    }

    /// Strict liveness check: valid signature *and* expiry strictly in the
    /// future. The expiry comparison is done here rather than left to the
    /// decoder, which tolerates `exp == now`.
    ///
    /// Any failure, from a truncated token to clock skew, reads as `false`.
    pub fn verify(&self, token: &str) -> bool {
        self.claims(token).is_ok_and(|claims| claims.exp > Utc::now().timestamp())
    }

    /// Decode the claim set, accepting expired tokens.
    ///
    /// The signature is always checked; only tampering or a garbled payload
    /// is rejected.
    pub fn claims(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::Malformed)
    }

    /// Re-issue a token carrying the same identity with a fresh window.
    ///
    /// Tokens whose expiry lies further back than `refresh_window_factor`
    /// validity windows are refused; the caller must authenticate again.
    pub fn refresh(&self, token: &str) -> Result<String, TokenError> {
        self.refresh_at(token, Utc::now())
    }

    fn refresh_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = self.claims(token)?;
        if !self.is_refreshable_at(&claims, now) {
            return Err(TokenError::TooOldToRefresh);
        }
        let reissued = SessionClaims {
            last_update: now.to_rfc3339(),
            iat: now.timestamp(),
            exp: (now + self.validity).timestamp(),
            ..claims
        };
        self.sign(&reissued)
    }

    /// Whether the claim set's expiry is still inside the refresh window.
    pub fn is_refreshable(&self, claims: &SessionClaims) -> bool {
        self.is_refreshable_at(claims, Utc::now())
    }

    fn is_refreshable_at(&self, claims: &SessionClaims, now: DateTime<Utc>) -> bool {
        claims.expires_at() >= now - self.validity * self.refresh_window_factor as i32
    }

    /// User id from a well-formed token, expired or not.
    pub fn extract_user_id(&self, token: &str) -> Result<posthub_core::UserId, TokenError> {
        Ok(self.claims(token)?.user_id)
    }

    /// Username from a well-formed token, expired or not.
    pub fn extract_username(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.claims(token)?.username)
    }

    /// Roles from a well-formed token; unknown role names are dropped.
    pub fn extract_roles(&self, token: &str) -> Result<Vec<crate::roles::Role>, TokenError> {
        Ok(self.claims(token)?.role_set())
    }
}
