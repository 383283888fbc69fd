use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde_json::{Map, Value};

use crate::services::auth::claims::{ClaimSet, ClaimsVerifier, Secret, VerificationFailure};

/// HS256 shared-secret verifier backed by `jsonwebtoken`.
///
/// - `is_expired` decodes with signature checks but without `exp` validation,
///   then compares `exp` against the clock itself.
/// - `all_claims` runs the full validation (signature + `exp`).
#[derive(Debug, Clone)]
pub struct JwtClaimsVerifier {
    leeway_seconds: u64,
}

impl JwtClaimsVerifier {
    pub fn new(leeway_seconds: u64) -> Self {
        Self { leeway_seconds }
    }

    fn validation(&self, validate_exp: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = validate_exp;
        // Tokens carry no audience; issuance is out of our hands.
        validation.validate_aud = false;
        validation.leeway = self.leeway_seconds;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }

    fn decode(
        &self,
        token: &str,
        secret: &Secret,
        validate_exp: bool,
    ) -> Result<ClaimSet, VerificationFailure> {
        let key = DecodingKey::from_secret(secret.expose().as_bytes());
        let data = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &key,
            &self.validation(validate_exp),
        )
        .map_err(map_jwt_error)?;

        Ok(ClaimSet::from(data.claims))
    }
}

impl Default for JwtClaimsVerifier {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ClaimsVerifier for JwtClaimsVerifier {
    fn is_expired(&self, token: &str, secret: &Secret) -> Result<bool, VerificationFailure> {
        let claims = self.decode(token, secret, false)?;

        let exp = match claims.get("exp") {
            Some(value) => value
                .as_i64()
                .ok_or_else(|| VerificationFailure::Malformed("'exp' is not an integer".into()))?,
            None => return Err(VerificationFailure::MissingClaim("exp".into())),
        };

        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);
        let now = chrono::Utc::now().timestamp();

        Ok(exp.saturating_add(leeway) < now)
    }

    fn all_claims(&self, token: &str, secret: &Secret) -> Result<ClaimSet, VerificationFailure> {
        self.decode(token, secret, true)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> VerificationFailure {
    match err.kind() {
        ErrorKind::ExpiredSignature => VerificationFailure::Expired,
        ErrorKind::InvalidSignature => VerificationFailure::SignatureInvalid,
        ErrorKind::MissingRequiredClaim(claim) => VerificationFailure::MissingClaim(claim.clone()),
        _ => VerificationFailure::Malformed(err.to_string()),
    }
}
