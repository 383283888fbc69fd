pub mod authenticator;
pub mod claims;
pub mod context;
pub mod error;
pub mod factory;
pub mod identity;
pub mod jwt_verifier;
pub mod resolver;

pub use authenticator::{AuthenticationOutcome, TokenAuthenticator, UnauthenticatedReason};
pub use claims::{ClaimSet, ClaimsVerifier, Secret, VerificationFailure};
pub use context::{Authentication, RequestDetails, SecurityContext, SecurityContextError};
pub use error::AuthError;
pub use factory::build_security;
pub use identity::AuthenticatedIdentity;
pub use jwt_verifier::JwtClaimsVerifier;
pub use resolver::{DefaultErrorResolver, ErrorResolver};
