//! Route definitions for the `/user` session resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// The login entry point. Rejected or missing sessions redirect here.
pub const LOGIN_PATH: &str = "/user/log-in";

/// Routes mounted at `/user`.
///
/// ```text
/// POST /log-in   -> login
/// POST /log-out  -> logout
/// GET  /me       -> me (requires session)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/log-in", post(auth::login))
        .route("/log-out", post(auth::logout))
        .route("/me", get(auth::me))
}
