/*
 * Responsibility
 * - Load settings from the environment (.env supported)
 * - JWT secret, security path tiers, CORS table inputs, CSRF switch, HTTP limits
 * - Missing required values fail startup
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;
use crate::services::auth::Secret;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for AppError {
    fn from(_: ConfigError) -> Self {
        AppError::Internal
    }
}

/// Transport limits applied to every route.
#[derive(Debug, Clone, Copy)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        Self {
            body_limit_bytes: 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    // HS256 signing secret shared with the token issuer. Never logged.
    pub jwt_secret: Secret,
    pub token_leeway_seconds: u64,

    // Strict tier: token authentication, authenticated unless open.
    pub strict_paths: Vec<String>,
    pub strict_open_paths: Vec<String>,

    // CORS: restricted paths only accept the listed origins; the rest accept any.
    pub cors_restricted_paths: Vec<String>,
    pub cors_restricted_origins: Vec<String>,

    pub csrf_enabled: bool,
    pub http: HttpLimits,
}

impl Config {
    /// Defaults for everything but the secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            app_env: AppEnv::Development,
            jwt_secret: Secret::new(jwt_secret),
            token_leeway_seconds: 0,
            strict_paths: vec!["/staff/**".into(), "/**/auth/**".into()],
            strict_open_paths: vec!["/staff/open/**".into()],
            cors_restricted_paths: vec!["/actors/**".into()],
            cors_restricted_origins: vec!["http://localhost:4200".into()],
            csrf_enabled: true,
            http: HttpLimits::default(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_secret =
            std::env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid("JWT_SECRET"));
        }
        let defaults = Self::with_secret(jwt_secret);

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let token_leeway_seconds = std::env::var("TOKEN_LEEWAY_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(defaults.token_leeway_seconds);

        let csrf_enabled = match std::env::var("CSRF_ENABLED") {
            Ok(v) => parse_bool(&v).ok_or(ConfigError::Invalid("CSRF_ENABLED"))?,
            Err(_) => defaults.csrf_enabled,
        };

        let body_limit_bytes = std::env::var("BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.http.body_limit_bytes);

        let request_timeout = std::env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http.request_timeout);

        Ok(Self {
            addr,
            app_env: AppEnv::from_env(),
            token_leeway_seconds,
            strict_paths: list_from_env("STRICT_PATHS", defaults.strict_paths.clone()),
            strict_open_paths: list_from_env(
                "STRICT_OPEN_PATHS",
                defaults.strict_open_paths.clone(),
            ),
            cors_restricted_paths: list_from_env(
                "CORS_RESTRICTED_PATHS",
                defaults.cors_restricted_paths.clone(),
            ),
            cors_restricted_origins: list_from_env(
                "CORS_RESTRICTED_ORIGINS",
                defaults.cors_restricted_origins.clone(),
            ),
            csrf_enabled,
            http: HttpLimits {
                body_limit_bytes,
                request_timeout,
            },
            ..defaults
        })
    }
}

// Comma-separated list; unset or blank falls back to `default`.
fn list_from_env(key: &str, default: Vec<String>) -> Vec<String> {
    let values = std::env::var(key)
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>();

    if values.is_empty() { default } else { values }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
