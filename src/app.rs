/*
 * Responsibility
 * - Load Config → build security state → assemble Router
 * - Layer order (outermost first): http, security headers, CORS, security filter
 * - axum::serve() with peer addresses (recorded next to the identity)
 */
use std::net::SocketAddr;
use std::panic;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::error::AppError;
use crate::middleware;
use crate::services::auth::{ClaimsVerifier, JwtClaimsVerifier, build_security};
use crate::state::AppState;
use crate::{api, middleware::cors::CorsTable};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,staff_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        // Surface panics through tracing; stderr may not be collected.
        // The process keeps running: the security filter turns panics during
        // authentication into error responses.
        tracing::error!(%info, "panic");
        default_hook(info);
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook();

    tracing::info!(
        "starting staff-gate in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let verifier: Arc<dyn ClaimsVerifier> =
        Arc::new(JwtClaimsVerifier::new(config.token_leeway_seconds));
    let state = build_state(&config, verifier)?;
    let app = build_router(state, &config)?;

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Process-level services, injected into the shared application state.
pub fn build_state(
    config: &Config,
    verifier: Arc<dyn ClaimsVerifier>,
) -> Result<AppState, AppError> {
    let security = build_security(config, verifier)?;

    for chain in security.chains.chains() {
        tracing::debug!(
            chain = chain.name(),
            token_authentication = chain.token_authentication(),
            csrf = chain.csrf_guard().is_enabled(),
            "security chain configured"
        );
    }

    Ok(AppState::new(security))
}

pub fn build_router(state: AppState, config: &Config) -> Result<Router, AppError> {
    let cors = CorsTable::from_config(config)?;

    let router = middleware::auth::access::apply(api::routes(), state.clone()).with_state(state);
    let router = middleware::cors::apply(router, cors);
    let router = middleware::security_headers::apply(router);

    Ok(middleware::http::apply(router, &config.http))
}
