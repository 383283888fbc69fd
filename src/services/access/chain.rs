//! Ordered security chains.
//!
//! A request is handled by exactly one chain: the first whose matchers accept
//! its path, or a permit-all catch-all when none does. Within a chain the
//! first matching rule decides; the chain's fallback covers the rest.

use crate::services::access::pattern::PathPattern;
use crate::services::auth::AuthenticatedIdentity;
use crate::services::csrf::CsrfGuard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    PermitAll,
    RequireAuthenticated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    Unauthenticated,
}

impl AccessPolicy {
    pub fn evaluate(self, identity: Option<&AuthenticatedIdentity>) -> AccessDecision {
        match (self, identity) {
            (Self::PermitAll, _) | (Self::RequireAuthenticated, Some(_)) => AccessDecision::Granted,
            (Self::RequireAuthenticated, None) => AccessDecision::Unauthenticated,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    pub pattern: PathPattern,
    pub policy: AccessPolicy,
}

#[derive(Debug, Clone)]
pub struct SecurityChain {
    name: String,
    matchers: Vec<PathPattern>,
    token_authentication: bool,
    rules: Vec<AccessRule>,
    fallback: AccessPolicy,
    csrf: CsrfGuard,
}

impl SecurityChain {
    /// A chain that permits everything and runs no filters until configured.
    pub fn new(name: impl Into<String>, matchers: Vec<PathPattern>) -> Self {
        Self {
            name: name.into(),
            matchers,
            token_authentication: false,
            rules: Vec::new(),
            fallback: AccessPolicy::PermitAll,
            csrf: CsrfGuard::disabled(),
        }
    }

    #[must_use]
    pub fn with_token_authentication(mut self) -> Self {
        self.token_authentication = true;
        self
    }

    #[must_use]
    pub fn rule(mut self, pattern: PathPattern, policy: AccessPolicy) -> Self {
        self.rules.push(AccessRule { pattern, policy });
        self
    }

    #[must_use]
    pub fn fallback(mut self, policy: AccessPolicy) -> Self {
        self.fallback = policy;
        self
    }

    #[must_use]
    pub fn csrf(mut self, guard: CsrfGuard) -> Self {
        self.csrf = guard;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn token_authentication(&self) -> bool {
        self.token_authentication
    }

    pub fn csrf_guard(&self) -> &CsrfGuard {
        &self.csrf
    }

    pub fn applies_to(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }

    pub fn policy_for(&self, path: &str) -> AccessPolicy {
        self.rules
            .iter()
            .find(|rule| rule.pattern.matches(path))
            .map_or(self.fallback, |rule| rule.policy)
    }

    pub fn decide(&self, path: &str, identity: Option<&AuthenticatedIdentity>) -> AccessDecision {
        self.policy_for(path).evaluate(identity)
    }
}

#[derive(Debug, Clone)]
pub struct FilterChains {
    chains: Vec<SecurityChain>,
    catch_all: SecurityChain,
}

impl FilterChains {
    pub fn new(chains: Vec<SecurityChain>) -> Self {
        Self {
            chains,
            catch_all: SecurityChain::new("catch-all", Vec::new()),
        }
    }

    /// First chain whose matchers accept `path`.
    pub fn resolve(&self, path: &str) -> &SecurityChain {
        self.chains
            .iter()
            .find(|chain| chain.applies_to(path))
            .unwrap_or(&self.catch_all)
    }

    pub fn chains(&self) -> &[SecurityChain] {
        &self.chains
    }
}
