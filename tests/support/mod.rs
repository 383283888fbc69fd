#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, HeaderValue, Response, header},
};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{Value, json};

use staff_gate::app::{build_router, build_state};
use staff_gate::config::Config;
use staff_gate::services::auth::{
    ClaimSet, ClaimsVerifier, JwtClaimsVerifier, Secret, VerificationFailure,
};

pub const SECRET: &str = "test_secret_key_for_testing_purposes_only";

#[derive(Clone)]
pub enum FakeBehavior {
    Valid(ClaimSet),
    Expired,
    ExpiryFailure(VerificationFailure),
    ClaimsFailure(VerificationFailure),
    // Blocks the calling thread before answering "not expired".
    Slow(Duration, ClaimSet),
    Panic,
}

/// Scripted `ClaimsVerifier` that counts calls.
pub struct FakeVerifier {
    behavior: FakeBehavior,
    expiry_calls: AtomicUsize,
    claims_calls: AtomicUsize,
}

impl FakeVerifier {
    pub fn new(behavior: FakeBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            expiry_calls: AtomicUsize::new(0),
            claims_calls: AtomicUsize::new(0),
        })
    }

    pub fn valid(claims: Value) -> Arc<Self> {
        Self::new(FakeBehavior::Valid(claim_set(claims)))
    }

    pub fn expiry_calls(&self) -> usize {
        self.expiry_calls.load(Ordering::SeqCst)
    }

    pub fn claims_calls(&self) -> usize {
        self.claims_calls.load(Ordering::SeqCst)
    }
}

impl ClaimsVerifier for FakeVerifier {
    fn is_expired(&self, _token: &str, _secret: &Secret) -> Result<bool, VerificationFailure> {
        self.expiry_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            FakeBehavior::Expired => Ok(true),
            FakeBehavior::ExpiryFailure(failure) => Err(failure.clone()),
            FakeBehavior::Panic => panic!("verifier exploded"),
            FakeBehavior::Slow(delay, _) => {
                std::thread::sleep(*delay);
                Ok(false)
            }
            FakeBehavior::Valid(_) | FakeBehavior::ClaimsFailure(_) => Ok(false),
        }
    }

    fn all_claims(&self, _token: &str, _secret: &Secret) -> Result<ClaimSet, VerificationFailure> {
        self.claims_calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            FakeBehavior::Valid(claims) | FakeBehavior::Slow(_, claims) => Ok(claims.clone()),
            FakeBehavior::ClaimsFailure(failure) => Err(failure.clone()),
            _ => Err(VerificationFailure::Internal("unexpected all_claims call".into())),
        }
    }
}

pub fn claim_set(claims: Value) -> ClaimSet {
    match claims {
        Value::Object(map) => ClaimSet::from(map),
        other => panic!("claims must be a JSON object, got {other}"),
    }
}

pub fn alice_claims() -> Value {
    json!({"sub": "alice", "jti": "42", "email": "a@x.com"})
}

pub fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("header value"),
    );
    headers
}

pub fn mint(claims: Value) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("token should encode")
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn config() -> Config {
    Config::with_secret(SECRET)
}

pub fn app_with(verifier: Arc<dyn ClaimsVerifier>, config: &Config) -> Router {
    let state = build_state(config, verifier).expect("state");
    build_router(state, config).expect("router")
}

/// Full stack with the real HS256 verifier.
pub fn app() -> Router {
    app_with(Arc::new(JwtClaimsVerifier::default()), &config())
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
