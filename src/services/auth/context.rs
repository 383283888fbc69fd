//! Request-scoped authentication slot.
//!
//! A `SecurityContext` is created empty when the security filter first sees a
//! request, travels in the request extensions, and is dropped with the request.
//! It is written at most once.

use axum::extract::ConnectInfo;
use axum::http::{Extensions, HeaderMap, HeaderName};
use serde::Serialize;
use std::net::SocketAddr;
use thiserror::Error;

use crate::services::auth::identity::AuthenticatedIdentity;

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Where a request came from. Kept next to the identity for audit logs.
///
/// The service is stateless, so the request id takes the place a session id
/// would have in a session-backed deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RequestDetails {
    pub remote_addr: Option<SocketAddr>,
    pub request_id: Option<String>,
}

impl RequestDetails {
    pub fn from_parts(headers: &HeaderMap, extensions: &Extensions) -> Self {
        let remote_addr = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        Self {
            remote_addr,
            request_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authentication {
    pub identity: AuthenticatedIdentity,
    pub details: RequestDetails,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecurityContextError {
    #[error("security context already holds an authenticated identity")]
    AlreadyPopulated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityContext {
    authentication: Option<Authentication>,
}

impl SecurityContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(&self) -> Option<&AuthenticatedIdentity> {
        self.authentication.as_ref().map(|a| &a.identity)
    }

    pub fn authentication(&self) -> Option<&Authentication> {
        self.authentication.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication.is_some()
    }

    /// Install the request's identity. Callers check `identity()` first;
    /// a second write is rejected instead of overwriting.
    pub fn set(
        &mut self,
        identity: AuthenticatedIdentity,
        details: RequestDetails,
    ) -> Result<(), SecurityContextError> {
        if self.authentication.is_some() {
            return Err(SecurityContextError::AlreadyPopulated);
        }

        self.authentication = Some(Authentication { identity, details });
        Ok(())
    }
}
