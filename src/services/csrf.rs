//! CSRF protection (double-submit cookie).
//!
//! State-changing requests must echo the `XSRF-TOKEN` cookie value in the
//! `X-XSRF-TOKEN` header. Requests without the cookie get one issued on the
//! way out so browser clients can pick it up.

use axum::http::{HeaderMap, HeaderValue, Method, header};
use uuid::Uuid;

use crate::services::access::PathPattern;

pub const CSRF_COOKIE: &str = "XSRF-TOKEN";
pub const CSRF_HEADER: &str = "x-xsrf-token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfCheck {
    // Guard disabled, safe method, or ignored path.
    Skipped,
    Passed,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct CsrfGuard {
    enabled: bool,
    ignored: Vec<PathPattern>,
}

impl CsrfGuard {
    pub fn new(ignored: Vec<PathPattern>) -> Self {
        Self {
            enabled: true,
            ignored,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ignored: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn check(&self, method: &Method, path: &str, headers: &HeaderMap) -> CsrfCheck {
        if !self.enabled || is_safe(method) || self.ignored.iter().any(|p| p.matches(path)) {
            return CsrfCheck::Skipped;
        }

        let cookie = cookie_value(headers, CSRF_COOKIE);
        let echoed = headers.get(CSRF_HEADER).and_then(|v| v.to_str().ok());

        match (cookie, echoed) {
            (Some(expected), Some(actual)) if !expected.is_empty() && expected == actual => {
                CsrfCheck::Passed
            }
            _ => CsrfCheck::Rejected,
        }
    }

    /// `Set-Cookie` value for a fresh token, when the client has none yet.
    pub fn token_cookie(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        if !self.enabled || cookie_value(headers, CSRF_COOKIE).is_some() {
            return None;
        }

        let token = Uuid::new_v4().simple().to_string();
        HeaderValue::from_str(&format!("{CSRF_COOKIE}={token}; Path=/; SameSite=Lax")).ok()
    }
}

/// Whether a response already sets the token cookie.
pub fn sets_token_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split_once('='))
        .any(|(name, _)| name.trim() == CSRF_COOKIE)
}

fn is_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
}
