/*
 * Responsibility
 * - Which security chain handles a path, and what that chain requires
 * - Default chains are built from Config (strict tier, then permissive tier)
 */
mod chain;
mod pattern;

pub use chain::{AccessDecision, AccessPolicy, AccessRule, FilterChains, SecurityChain};
pub use pattern::{PathPattern, PatternError};

use crate::config::Config;
use crate::services::csrf::CsrfGuard;

impl FilterChains {
    /// Strict tier for privileged paths (token authentication, authenticated
    /// by default, explicit open paths), then a permissive tier for the rest.
    pub fn from_config(config: &Config) -> Result<Self, PatternError> {
        let open_paths = PathPattern::parse_all(&config.strict_open_paths)?;

        let strict_paths = PathPattern::parse_all(&config.strict_paths)?;

        let mut strict = SecurityChain::new("strict", strict_paths)
            .with_token_authentication()
            .fallback(AccessPolicy::RequireAuthenticated);
        for pattern in &open_paths {
            strict = strict.rule(pattern.clone(), AccessPolicy::PermitAll);
        }

        let mut permissive = SecurityChain::new("permissive", vec![PathPattern::parse("/**")?]);

        if config.csrf_enabled {
            strict = strict.csrf(CsrfGuard::new(open_paths));
            permissive = permissive.csrf(CsrfGuard::new(Vec::new()));
        }

        Ok(Self::new(vec![strict, permissive]))
    }
}
