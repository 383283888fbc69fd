use thiserror::Error;

use crate::services::auth::context::SecurityContextError;

/// Authentication failures that must not be mistaken for "no credentials".
///
/// These cross the authenticator boundary and are turned into a response by
/// the injected `ErrorResolver`.
#[derive(Debug, Error)]
pub enum AuthError {
    // Signed, unexpired token whose `jti` is not an integer.
    #[error("token identifier is not an integer: {value}")]
    IdentifierParse { value: String },

    #[error("claims verifier fault: {0}")]
    Verifier(String),

    #[error(transparent)]
    Context(#[from] SecurityContextError),

    #[error("unexpected failure while authenticating: {0}")]
    Unexpected(String),
}
