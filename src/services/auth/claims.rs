//! Claims verifier contract.
//!
//! Token signing and verification live behind `ClaimsVerifier`; the
//! authenticator only ever sees a `ClaimSet` or a `VerificationFailure`.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Shared signing secret. Never printable.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(**redacted**)")
    }
}

/// Why the verifier refused a token.
///
/// Everything except `Internal` is a routine rejection: the request simply
/// stays unauthenticated. `Internal` means the verifier itself misbehaved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationFailure {
    #[error("token expired")]
    Expired,
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("invalid token signature")]
    SignatureInvalid,
    #[error("missing required claim: {0}")]
    MissingClaim(String),
    #[error("verifier fault: {0}")]
    Internal(String),
}

/// Verified claims of a bearer token, keyed by claim name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String claim; non-string values read as absent.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    pub fn identifier(&self) -> Option<&Value> {
        self.get("jti")
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        Self::new(claims)
    }
}

/// Token checks the authenticator delegates to.
///
/// Both calls are synchronous; implementations must not retry.
pub trait ClaimsVerifier: Send + Sync {
    // Ok(true) when the token's `exp` lies in the past.
    fn is_expired(&self, token: &str, secret: &Secret) -> Result<bool, VerificationFailure>;

    fn all_claims(&self, token: &str, secret: &Secret) -> Result<ClaimSet, VerificationFailure>;
}
