/*
 * Responsibility
 * - Shared, read-only context bound to the Router (AppState)
 * - Everything the security filter needs, loaded once at startup
 * - Clone is cheap (Arc inside)
 */
use std::sync::Arc;

use crate::services::access::FilterChains;
use crate::services::auth::{ErrorResolver, TokenAuthenticator};

pub struct SecurityState {
    pub authenticator: TokenAuthenticator,
    pub chains: FilterChains,
    pub error_resolver: Arc<dyn ErrorResolver>,
}

#[derive(Clone)]
pub struct AppState {
    pub security: Arc<SecurityState>,
}

impl AppState {
    pub fn new(security: SecurityState) -> Self {
        Self {
            security: Arc::new(security),
        }
    }
}
