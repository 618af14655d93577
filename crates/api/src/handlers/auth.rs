//! Handlers for the `/user` session routes (log-in, log-out, me).

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use stanchion_core::error::CoreError;
use stanchion_core::types::DbId;

use crate::auth::cookie::{sign_in, sign_out};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::identity::{CurrentUser, OptionalUser};
use crate::query::ReturnTo;
use crate::routes::auth::LOGIN_PATH;
use crate::state::AppState;

/// Where successful logins land without a `return_to`.
const DEFAULT_REDIRECT: &str = "/";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /user/log-in`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Response body for `GET /user/me`: the gate's accessors as JSON.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: DbId,
    pub username: String,
    pub remember_me: bool,
    pub session_timeout: u8,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /user/log-in
///
/// Authenticate with username + password and issue the session cookie.
/// Failures are a uniform 401 with no field detail; nothing distinguishes
/// an unknown username from a wrong password.
pub async fn login(
    State(state): State<AppState>,
    identity: OptionalUser,
    jar: CookieJar,
    Query(query): Query<ReturnTo>,
    Json(input): Json<LoginRequest>,
) -> AppResult<(CookieJar, Redirect)> {
    // Already signed in: don't re-issue, just go home.
    if identity.is_authenticated() {
        return Ok((jar, Redirect::to(DEFAULT_REDIRECT)));
    }

    // 1. Find user by username.
    let user = state
        .store
        .find_by_username(&input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    // 2. Verify password.
    let password_valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    // 3. Issue the session. The timeout hint starts at zero; only the
    //    claims carry it and renewal resets it anyway.
    let jar = sign_in(jar, &user, input.remember_me, 0, &state.config.session)
        .map_err(|e| AppError::InternalError(format!("Token signing error: {e}")))?;

    tracing::info!(user_id = user.id, "user logged in");

    // 4. Send the client on, but only to a site-local path.
    Ok((
        jar,
        Redirect::to(local_redirect_target(query.return_to.as_deref())),
    ))
}

/// POST /user/log-out
///
/// Clear the session cookie and send the client to the login route.
/// Idempotent: logging out without a session is still a 303.
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (sign_out(jar), Redirect::to(LOGIN_PATH))
}

/// GET /user/me
///
/// The resolved identity of the current session.
pub async fn me(user: CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        id: user.user_id,
        username: user.username,
        remember_me: user.remember_me,
        session_timeout: user.timeout_hint,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Open-redirect guard: accept only site-local paths. Anything absolute,
/// protocol-relative (`//`) or backslash-mangled falls back to `/`.
fn local_redirect_target(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path)
            if path.starts_with('/') && !path.starts_with("//") && !path.starts_with("/\\") =>
        {
            path
        }
        _ => DEFAULT_REDIRECT,
    }
}
