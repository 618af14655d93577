//! Root-level health probe.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct Health {
    status: &'static str,
    version: &'static str,
    db_healthy: bool,
}

/// GET /health.
///
/// Always answers 200 with `status` of `ok` or `degraded`, so an
/// orchestrator can tell "process down" apart from "process up but the
/// database is not".
async fn health(State(state): State<AppState>) -> Json<Health> {
    let db_healthy = stanchion_db::health_check(&state.pool).await.is_ok();

    Json(Health {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

/// Mounted at the router root, outside the session-validated tree.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
