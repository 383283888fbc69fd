//! Factory: build the security pipeline from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::access::FilterChains;
use crate::services::auth::{ClaimsVerifier, DefaultErrorResolver, TokenAuthenticator};
use crate::state::SecurityState;

pub fn build_security(
    config: &Config,
    verifier: Arc<dyn ClaimsVerifier>,
) -> Result<SecurityState, AppError> {
    let chains = FilterChains::from_config(config)?;

    let authenticator = TokenAuthenticator::new(verifier, config.jwt_secret.clone());

    Ok(SecurityState {
        authenticator,
        chains,
        error_resolver: Arc::new(DefaultErrorResolver),
    })
}
