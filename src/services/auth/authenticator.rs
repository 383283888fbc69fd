//! Bearer token authentication.
//!
//! `TokenAuthenticator::authenticate` decides whether a request is bound to an
//! identity. Missing or unusable credentials are routine: the request carries
//! on unauthenticated and the access rules reject it later if they must.
//! Only data-integrity faults (a valid token with a corrupt `jti`) and verifier
//! faults come back as `Err`.

use axum::http::{HeaderMap, header};
use base64::Engine;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::{fmt, sync::Arc};
use tracing::{debug, info, warn};

use crate::services::auth::{
    claims::{ClaimSet, ClaimsVerifier, Secret, VerificationFailure},
    context::{RequestDetails, SecurityContext},
    error::AuthError,
    identity::AuthenticatedIdentity,
};

pub const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnauthenticatedReason {
    MissingHeader,
    WrongScheme,
    VerificationExpired,
    VerificationFailed(VerificationFailure),
    ClaimsExtractionFailed(VerificationFailure),
}

impl fmt::Display for UnauthenticatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingHeader => write!(f, "missing-header"),
            Self::WrongScheme => write!(f, "wrong-scheme"),
            Self::VerificationExpired => write!(f, "verification-expired"),
            Self::VerificationFailed(reason) => write!(f, "verification-failed: {reason}"),
            Self::ClaimsExtractionFailed(reason) => {
                write!(f, "claims-extraction-failed: {reason}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthenticationOutcome {
    Authenticated(AuthenticatedIdentity),
    Unauthenticated(UnauthenticatedReason),
    // The context was populated by an earlier pass over the same request.
    AlreadyAuthenticated,
}

impl fmt::Display for AuthenticationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authenticated(identity) => write!(f, "authenticated({})", identity.username),
            Self::Unauthenticated(reason) => write!(f, "unauthenticated({reason})"),
            Self::AlreadyAuthenticated => write!(f, "already-authenticated"),
        }
    }
}

#[derive(Clone)]
pub struct TokenAuthenticator {
    verifier: Arc<dyn ClaimsVerifier>,
    secret: Secret,
}

impl fmt::Debug for TokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("TokenAuthenticator").finish_non_exhaustive()
    }
}

impl TokenAuthenticator {
    pub fn new(verifier: Arc<dyn ClaimsVerifier>, secret: Secret) -> Self {
        Self { verifier, secret }
    }

    /// Run one authentication pass over a request.
    ///
    /// Writes to `context` at most once, and never when it is already
    /// populated.
    pub fn authenticate(
        &self,
        headers: &HeaderMap,
        details: &RequestDetails,
        context: &mut SecurityContext,
    ) -> Result<AuthenticationOutcome, AuthError> {
        let token = match bearer_token(headers) {
            Ok(token) => token,
            Err(reason) => return Ok(unauthenticated(reason)),
        };

        match self.verifier.is_expired(token, &self.secret) {
            Ok(false) => {}
            Ok(true) | Err(VerificationFailure::Expired) => {
                return Ok(unauthenticated(UnauthenticatedReason::VerificationExpired));
            }
            Err(VerificationFailure::Internal(message)) => {
                return Err(AuthError::Verifier(message));
            }
            Err(failure) => {
                return Ok(unauthenticated(UnauthenticatedReason::VerificationFailed(
                    failure,
                )));
            }
        }

        debug!(token = %fingerprint(token), "processing bearer token");

        let claims = match self.verifier.all_claims(token, &self.secret) {
            Ok(claims) => claims,
            Err(VerificationFailure::Internal(message)) => {
                return Err(AuthError::Verifier(message));
            }
            Err(failure) => {
                return Ok(unauthenticated(
                    UnauthenticatedReason::ClaimsExtractionFailed(failure),
                ));
            }
        };

        let Some(username) = claims.subject() else {
            return Ok(unauthenticated(
                UnauthenticatedReason::ClaimsExtractionFailed(VerificationFailure::MissingClaim(
                    "sub".into(),
                )),
            ));
        };
        let id = parse_identifier(&claims)?;
        let email = claims.get_str("email").map(str::to_owned);
        let phone = claims.get_str("phone").map(str::to_owned);

        debug!(username, id, "resolved token claims");

        if context.is_authenticated() {
            info!(username, "request already authenticated");
            return Ok(AuthenticationOutcome::AlreadyAuthenticated);
        }

        let identity = AuthenticatedIdentity::new(id, username, email, phone);
        context.set(identity.clone(), details.clone())?;

        info!(
            username = %identity.username,
            id = identity.id,
            request_id = ?details.request_id,
            "authenticated request"
        );

        Ok(AuthenticationOutcome::Authenticated(identity))
    }
}

fn unauthenticated(reason: UnauthenticatedReason) -> AuthenticationOutcome {
    warn!(reason = %reason, "request left unauthenticated");
    AuthenticationOutcome::Unauthenticated(reason)
}

/// Extract the raw token from `Authorization: Bearer <token>`.
///
/// An absent header and a blank one are the same thing. The scheme is
/// matched case-sensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, UnauthenticatedReason> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(UnauthenticatedReason::MissingHeader);
    };

    if value.as_bytes().iter().all(u8::is_ascii_whitespace) {
        return Err(UnauthenticatedReason::MissingHeader);
    }

    value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .ok_or(UnauthenticatedReason::WrongScheme)
}

fn parse_identifier(claims: &ClaimSet) -> Result<i32, AuthError> {
    match claims.identifier() {
        Some(Value::String(raw)) => raw.parse::<i32>().map_err(|_| AuthError::IdentifierParse {
            value: raw.clone(),
        }),
        Some(other) => Err(AuthError::IdentifierParse {
            value: other.to_string(),
        }),
        None => Err(AuthError::IdentifierParse {
            value: "<missing>".into(),
        }),
    }
}

// Tokens never reach the logs; this digest is enough to correlate them.
fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    encoded.chars().take(16).collect()
}
