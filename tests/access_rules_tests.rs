mod support;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::Value;
use staff_gate::app::build_state;
use staff_gate::config::Config;
use staff_gate::error::AppError;
use staff_gate::services::access::{AccessDecision, FilterChains};
use staff_gate::services::auth::AuthenticatedIdentity;
use tower::ServiceExt;

use crate::support::{FakeVerifier, alice_claims, app, config, json_body};

fn chains() -> FilterChains {
    FilterChains::from_config(&config()).expect("chains")
}

#[test]
fn strict_tier_covers_staff_and_auth_paths() {
    let chains = chains();

    assert_eq!(chains.resolve("/staff/reports").name(), "strict");
    assert_eq!(chains.resolve("/staff/open/anything").name(), "strict");
    assert_eq!(chains.resolve("/api/auth/session").name(), "strict");
    assert_eq!(chains.resolve("/public/info").name(), "permissive");
    assert!(chains.resolve("/staff/me").token_authentication());
    assert!(!chains.resolve("/public/info").token_authentication());
}

#[test]
fn open_paths_are_permitted_without_identity() {
    let chains = chains();
    let chain = chains.resolve("/staff/open/anything");

    assert_eq!(
        chain.decide("/staff/open/anything", None),
        AccessDecision::Granted
    );
}

#[test]
fn protected_paths_need_an_identity() {
    let chains = chains();
    let chain = chains.resolve("/staff/reports");
    let identity = AuthenticatedIdentity::new(42, "alice", None, None);

    assert_eq!(
        chain.decide("/staff/reports", None),
        AccessDecision::Unauthenticated
    );
    assert_eq!(
        chain.decide("/staff/reports", Some(&identity)),
        AccessDecision::Granted
    );
}

#[test]
fn custom_tiers_come_from_config() {
    let config = Config {
        strict_paths: vec!["/admin/**".into()],
        strict_open_paths: vec!["/admin/login".into()],
        ..config()
    };
    let chains = FilterChains::from_config(&config).expect("chains");

    assert_eq!(chains.resolve("/staff/reports").name(), "permissive");
    assert_eq!(
        chains.resolve("/admin/users").decide("/admin/users", None),
        AccessDecision::Unauthenticated
    );
    assert_eq!(
        chains.resolve("/admin/login").decide("/admin/login", None),
        AccessDecision::Granted
    );
}

#[test]
fn relative_patterns_fail_chain_construction() {
    let config = Config {
        strict_paths: vec!["staff/**".into()],
        ..config()
    };

    assert!(FilterChains::from_config(&config).is_err());
    assert!(matches!(
        build_state(&config, FakeVerifier::valid(alice_claims())),
        Err(AppError::Internal)
    ));
}

#[tokio::test]
async fn open_staff_path_is_reachable_without_token() {
    let res = app()
        .oneshot(
            Request::builder()
                .uri("/staff/open/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["path"], "/staff/open/anything");
}

#[tokio::test]
async fn protected_staff_path_rejects_missing_token() {
    let res = app()
        .oneshot(
            Request::builder()
                .uri("/staff/reports")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(res).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    assert_eq!(body["error"]["message"], "No authorized access");
}

#[tokio::test]
async fn unknown_strict_path_is_unauthorized_before_not_found() {
    let res = app()
        .oneshot(
            Request::builder()
                .uri("/staff/nowhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_path_is_reachable_without_token() {
    let res = app()
        .oneshot(
            Request::builder()
                .uri("/public/info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["authenticated"], Value::Bool(false));
}

#[tokio::test]
async fn unknown_public_path_is_not_found() {
    let res = app()
        .oneshot(
            Request::builder()
                .uri("/public/nowhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body = json_body(res).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
