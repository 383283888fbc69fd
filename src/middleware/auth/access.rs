//! Security filter: chain resolution → CSRF → bearer token → access decision.
//!
//! The `SecurityContext` travels in request extensions. When the filter runs
//! more than once for the same request (nested routers, re-applied layers),
//! later passes see the context left by the first one.

use std::any::Any;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::error::AppError;
use crate::services::access::AccessDecision;
use crate::services::auth::{AuthError, AuthenticationOutcome, RequestDetails, SecurityContext};
use crate::services::csrf::{CsrfCheck, sets_token_cookie};
use crate::state::AppState;

/// Put the security filter in front of every route of `router`, the
/// fallback included.
///
/// ```ignore
/// let router = api::routes();
/// let router = middleware::auth::access::apply(router, state.clone());
/// let app = router.with_state(state);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, security_filter))
}

async fn security_filter(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_owned();
    let chain = state.security.chains.resolve(&path);

    let csrf = chain.csrf_guard();
    if csrf.check(req.method(), &path, req.headers()) == CsrfCheck::Rejected {
        warn!(chain = chain.name(), path = %path, "csrf token missing or mismatched");
        return AppError::Forbidden.into_response();
    }
    let csrf_cookie = csrf.token_cookie(req.headers());

    let details = RequestDetails::from_parts(req.headers(), req.extensions());
    let mut context = req
        .extensions_mut()
        .remove::<SecurityContext>()
        .unwrap_or_default();

    if chain.token_authentication() {
        match run_authenticator(&state, req.headers().clone(), details.clone(), context).await {
            Ok((outcome, authenticated)) => {
                debug!(chain = chain.name(), outcome = %outcome, "token pass complete");
                context = authenticated;
            }
            Err(err) => {
                error!(error = %err, path = %path, "failed to process bearer token");
                return state
                    .security
                    .error_resolver
                    .resolve(&err, &details)
                    .into_response();
            }
        }
    }

    if chain.decide(&path, context.identity()) == AccessDecision::Unauthenticated {
        debug!(chain = chain.name(), path = %path, "access requires authentication");
        return AppError::Unauthorized.into_response();
    }

    req.extensions_mut().insert(context);
    let mut response = next.run(req).await;

    // An inner pass over the same request may have issued one already.
    if let Some(cookie) = csrf_cookie {
        if !sets_token_cookie(response.headers()) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }

    response
}

// Verifiers are synchronous and may block, so the pass runs on the blocking
// pool where the request timeout can still answer. A panic inside the
// authenticator (or the verifier it calls) becomes `AuthError::Unexpected`.
async fn run_authenticator(
    state: &AppState,
    headers: HeaderMap,
    details: RequestDetails,
    mut context: SecurityContext,
) -> Result<(AuthenticationOutcome, SecurityContext), AuthError> {
    let security = Arc::clone(&state.security);

    let pass = tokio::task::spawn_blocking(move || -> Result<_, AuthError> {
        let outcome = security
            .authenticator
            .authenticate(&headers, &details, &mut context)?;
        Ok((outcome, context))
    });

    match pass.await {
        Ok(result) => result,
        Err(err) if err.is_panic() => {
            Err(AuthError::Unexpected(panic_message(&*err.into_panic())))
        }
        Err(err) => Err(AuthError::Unexpected(err.to_string())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic while authenticating".to_owned()
    }
}
