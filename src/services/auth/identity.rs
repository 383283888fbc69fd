/*
 * Responsibility
 * - The identity a verified bearer token resolves to
 * - Handlers only ever see this type (through the security context)
 */
use serde::Serialize;
use std::collections::BTreeSet;

/// Identity bound to a request after successful token authentication.
///
/// - `id` comes from the token's `jti` claim (decimal string)
/// - `username` comes from `sub`
/// - `authorities` stays empty: access decisions only ask "authenticated or not"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedIdentity {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub authorities: BTreeSet<String>,
}

impl AuthenticatedIdentity {
    pub fn new(
        id: i32,
        username: impl Into<String>,
        email: Option<String>,
        phone: Option<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            email,
            phone,
            authorities: BTreeSet::new(),
        }
    }

    pub fn authorities(&self) -> &BTreeSet<String> {
        &self.authorities
    }
}
