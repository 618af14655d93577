pub mod auth;
pub mod health;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the application route tree (health is mounted separately).
///
/// Route hierarchy:
///
/// ```text
/// /user/log-in       login (public)
/// /user/log-out      logout (always 303, session or not)
/// /user/me           current session identity (requires session)
///
/// /users             list, create (requires session)
/// /users/{id}        get, update, delete (requires session)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Session routes (login, logout, me).
        .nest("/user", auth::router())
        // User CRUD.
        .nest("/users", users::router())
}
