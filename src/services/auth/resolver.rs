use crate::error::AppError;
use crate::services::auth::{context::RequestDetails, error::AuthError};

/// Turns an escalated authentication error into the response sent back.
///
/// Injected into the security filter so deployments can swap the mapping
/// without touching the authenticator.
pub trait ErrorResolver: Send + Sync {
    fn resolve(&self, error: &AuthError, details: &RequestDetails) -> AppError;
}

/// Every escalated error is a server-side fault: answer 500 and keep the
/// reason in the logs only.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorResolver;

impl ErrorResolver for DefaultErrorResolver {
    fn resolve(&self, error: &AuthError, details: &RequestDetails) -> AppError {
        tracing::debug!(
            error = %error,
            request_id = ?details.request_id,
            "resolved authentication error as internal"
        );

        match error {
            AuthError::IdentifierParse { .. }
            | AuthError::Verifier(_)
            | AuthError::Context(_)
            | AuthError::Unexpected(_) => AppError::Internal,
        }
    }
}
