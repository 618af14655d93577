//! Shared application router builder.
//!
//! Provides [`build_app_router`] so the production binary (`main.rs`) and
//! the integration tests (`tests/common/mod.rs`) assemble the exact same
//! middleware stack around the routes.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, StatusCode};
use axum::{middleware, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::auth::validator::validate_session;
use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

/// Build the full application [`Router`] with all middleware attached.
///
/// axum applies `.layer` calls bottom-up, so the last layer in the chain
/// below is the first one a request meets. Outermost to innermost:
///
/// - CORS (preflights are answered here and never reach the session check)
/// - request-id generation
/// - request/response tracing
/// - request-id propagation onto responses
/// - request timeout
/// - panic recovery
/// - session validation (scoped to the API routes, so every route but the
///   health probe sees a checked, renewed, or cleared session)
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let request_id = HeaderName::from_static("x-request-id");

    Router::new()
        // Health probe stays outside the session-validated tree: the
        // validation layer is scoped to the API routes below, so a health
        // poll never touches the store.
        .merge(routes::health::router())
        // Session validation sits inside the timeout layer so its store
        // reads inherit the request deadline.
        .merge(routes::api_routes().layer(middleware::from_fn_with_state(
            state.clone(),
            validate_session,
        )))
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors_layer(config))
        .with_state(state)
}

/// CORS for the browser frontend.
///
/// Origins come from configuration and are parsed eagerly so that an
/// invalid origin aborts startup instead of serving a broken policy.
/// Credentials are allowed because the session rides in a cookie.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|err| panic!("Invalid CORS origin '{origin}': {err}"))
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
