//! CORS policy for browser clients.
//!
//! Note:
//! - CORS is enforced by browsers. Native clients and server-to-server calls are not
//!   restricted by CORS.
//! - Applied at the Router level, outside the security filter, so preflight requests
//!   are answered without credentials.
//!
//! Policy table (first matching path pattern wins):
//! - restricted paths (`/actors/**` by default): only the configured origins
//! - everything else (`/**`): any origin
//!
//! Both entries allow credentials, so origins and methods are echoed back
//! rather than answered with `*`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header, request::Parts};
use regex::Regex;
use tower_http::cors::{AllowCredentials, AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use url::Url;

use crate::config::Config;
use crate::services::access::{PathPattern, PatternError};

/// An allowed-origin entry: `*`, an exact origin, or a host wildcard
/// such as `https://*.example.com`.
#[derive(Debug, Clone)]
pub enum OriginPattern {
    Any,
    Exact(String),
    Wildcard(Regex),
}

impl OriginPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let raw = raw.trim();

        if raw == "*" {
            return Ok(Self::Any);
        }

        if raw.contains('*') {
            let pattern = format!("^{}$", regex::escape(raw).replace(r"\*", "[^/]*"));
            return Regex::new(&pattern)
                .map(Self::Wildcard)
                .map_err(|source| PatternError::Regex {
                    pattern: raw.to_owned(),
                    source,
                });
        }

        Ok(Self::Exact(normalize_origin(raw).unwrap_or_else(|| raw.to_owned())))
    }

    pub fn matches(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => normalize_origin(origin).is_some_and(|o| &o == expected),
            Self::Wildcard(regex) => regex.is_match(origin),
        }
    }
}

// scheme://host[:port], lowercased, default port dropped.
fn normalize_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let origin = url.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

#[derive(Debug, Clone)]
pub enum AllowedHeaders {
    Any,
    List(Vec<HeaderName>),
}

#[derive(Debug, Clone)]
pub struct CorsPolicy {
    pub allowed_origins: Vec<OriginPattern>,
    pub allowed_methods: Vec<Method>,
    pub allowed_headers: AllowedHeaders,
    pub allow_credentials: bool,
}

impl CorsPolicy {
    fn allows_origin(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|p| p.matches(origin))
    }

    fn allows_method(&self, method: &str) -> bool {
        self.allowed_methods.iter().any(|m| m.as_str() == method)
    }

    fn allows_headers(&self, requested: Option<&HeaderValue>) -> bool {
        let AllowedHeaders::List(allowed) = &self.allowed_headers else {
            return true;
        };
        let Some(requested) = requested.and_then(|v| v.to_str().ok()) else {
            return true;
        };

        requested
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .all(|h| allowed.iter().any(|a| a.as_str().eq_ignore_ascii_case(h)))
    }
}

fn standard_methods() -> Vec<Method> {
    vec![
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ]
}

#[derive(Debug, Clone, Default)]
pub struct CorsTable {
    entries: Vec<(PathPattern, CorsPolicy)>,
}

impl CorsTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn register(mut self, pattern: PathPattern, policy: CorsPolicy) -> Self {
        self.entries.push((pattern, policy));
        self
    }

    pub fn from_config(config: &Config) -> Result<Self, PatternError> {
        let restricted_origins = config
            .cors_restricted_origins
            .iter()
            .map(|o| OriginPattern::parse(o))
            .collect::<Result<Vec<_>, _>>()?;

        let restricted = CorsPolicy {
            allowed_origins: restricted_origins,
            allowed_methods: standard_methods(),
            allowed_headers: AllowedHeaders::Any,
            allow_credentials: true,
        };
        let default = CorsPolicy {
            allowed_origins: vec![OriginPattern::Any],
            allowed_methods: standard_methods(),
            allowed_headers: AllowedHeaders::Any,
            allow_credentials: true,
        };

        let mut table = Self::new();
        for pattern in PathPattern::parse_all(&config.cors_restricted_paths)? {
            table = table.register(pattern, restricted.clone());
        }

        Ok(table.register(PathPattern::parse("/**")?, default))
    }

    pub fn resolve(&self, path: &str) -> Option<&CorsPolicy> {
        self.entries
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, policy)| policy)
    }

    /// Whether `origin` may talk to the requested path. For preflight requests
    /// the announced method and headers are checked too.
    pub fn permits(&self, origin: &HeaderValue, parts: &Parts) -> bool {
        let Some(policy) = self.resolve(parts.uri.path()) else {
            return false;
        };
        let Ok(origin) = origin.to_str() else {
            return false;
        };
        if !policy.allows_origin(origin) {
            return false;
        }

        let requested_method = parts
            .headers
            .get(header::ACCESS_CONTROL_REQUEST_METHOD)
            .and_then(|v| v.to_str().ok());

        match requested_method {
            Some(method) if parts.method == Method::OPTIONS => {
                policy.allows_method(method)
                    && policy.allows_headers(
                        parts.headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS),
                    )
            }
            _ => policy.allows_method(parts.method.as_str()),
        }
    }

    pub fn allows_credentials(&self, parts: &Parts) -> bool {
        self.resolve(parts.uri.path())
            .is_some_and(|policy| policy.allow_credentials)
    }
}

/// Apply the CORS table to the given Router.
///
/// Rejected origins simply get no CORS headers; the browser does the rest.
pub fn apply(router: Router, table: CorsTable) -> Router {
    let table = Arc::new(table);
    let origin_table = Arc::clone(&table);
    let credentials_table = table;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin, parts| {
            origin_table.permits(origin, parts)
        }))
        .allow_credentials(AllowCredentials::predicate(move |_origin, parts| {
            credentials_table.allows_credentials(parts)
        }))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .max_age(Duration::from_secs(60 * 30));

    router.layer(cors)
}
