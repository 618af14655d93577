//! Per-request session validation: the valid / renew / reject machine.
//!
//! Applied to the API routes as an axum middleware layer. Every request
//! carrying the session cookie gets its token checked against a live read
//! of the owning user's `updated_at`. Outcomes:
//!
//! - **valid** -- token is newer than the user's last modification; the
//!   identity is injected and the request proceeds untouched.
//! - **renew** -- the user changed after issuance but still exists; fresh
//!   claims are derived from a fresh row (`remember` preserved, timeout
//!   hint reset) and the replacement cookie rides the response out.
//! - **reject** -- undecodable/unstamped token or the user is gone; the
//!   cookie is cleared and the request continues unauthenticated, leaving
//!   the forced re-login outcome to the identity gate.
//!
//! Requests without the cookie pass through untouched.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::CookieJar;

use crate::auth::claims::{decode_token, SessionClaims};
use crate::auth::cookie::{attach, sign_out, SESSION_COOKIE};
use crate::error::AppError;
use crate::middleware::identity::CurrentUser;
use crate::state::AppState;

/// Grace window substituted when a user row carries no update stamp: the
/// stamp is assumed to lie just before issuance, so the token validates.
const MISSING_STAMP_GRACE_US: i64 = 10_000_000;

/// Pure freshness decision, separated from IO.
///
/// A token is fresh while its issuance instant lies strictly after the
/// user's last modification. An issuance exactly equal to the stamp is
/// stale: the modification superseded the token.
pub fn is_fresh(issued_at_us: i64, last_updated_us: Option<i64>) -> bool {
    let last_updated = last_updated_us.unwrap_or(issued_at_us - MISSING_STAMP_GRACE_US);
    issued_at_us > last_updated
}

/// Session validation middleware, registered via
/// `middleware::from_fn_with_state` ahead of all routes.
pub async fn validate_session(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(cookie) = jar.get(SESSION_COOKIE) else {
        // Anonymous request; route protection is the gate's job.
        return next.run(request).await;
    };

    let config = &state.config.session;

    // Token-level failures (bad signature, expired, not a JWT at all) and
    // a missing issuance stamp are protocol errors: destroy the session.
    let claims = match decode_token(cookie.value(), config) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "session token failed verification");
            return reject(jar, request, next).await;
        }
    };
    let Some(issued_at_us) = claims.iat_us else {
        tracing::debug!(user_id = claims.uid, "session token has no issuance stamp");
        return reject(jar, request, next).await;
    };

    let last_updated = match state.store.last_updated_at(claims.uid).await {
        Ok(stamp) => stamp,
        Err(err) => return AppError::Database(err).into_response(),
    };

    let fresh = is_fresh(issued_at_us, last_updated.map(|ts| ts.timestamp_micros()));

    // Stamped and fresh: the stamp read already proved the row exists.
    if fresh && last_updated.is_some() {
        request.extensions_mut().insert(identity_from(&claims));
        return next.run(request).await;
    }

    // Absent stamp or stale token: the row itself decides. The stamp read
    // cannot tell a deleted row from a never-mutated one, so the grace
    // window is only honoured for rows that still exist.
    let user = match state.store.find_by_id(claims.uid).await {
        Ok(user) => user,
        Err(err) => return AppError::Database(err).into_response(),
    };
    let Some(user) = user else {
        tracing::info!(user_id = claims.uid, "session rejected: user no longer exists");
        return reject(jar, request, next).await;
    };

    if fresh {
        request.extensions_mut().insert(identity_from(&claims));
        return next.run(request).await;
    }

    // Renewal is a full re-issue: fresh claims from the fresh row, new
    // absolute expiry, remember-me carried over, timeout hint reset.
    let renewed = SessionClaims::issue(&user, claims.remember, 0, config);
    let jar = match attach(jar, &renewed, config) {
        Ok(jar) => jar,
        Err(err) => {
            tracing::error!(error = %err, "failed to re-sign session token");
            return AppError::InternalError("session renewal failed".to_string()).into_response();
        }
    };
    tracing::debug!(user_id = user.id, "session renewed");

    request.extensions_mut().insert(identity_from(&renewed));
    let response = next.run(request).await;
    // A handler that signed the user out has final say: attaching the
    // renewed cookie after its removal would resurrect the session.
    if session_cookie_value(&response) == Some("") {
        return response;
    }
    (jar, response).into_response()
}

/// Clear the session cookie and let the request continue unauthenticated.
async fn reject(jar: CookieJar, request: Request, next: Next) -> Response {
    let jar = sign_out(jar);
    let response = next.run(request).await;
    // A login handler downstream may have issued a fresh session off the
    // same request; its cookie stands, and the removal for the dead token
    // would only override it.
    if session_cookie_value(&response).is_some_and(|value| !value.is_empty()) {
        return response;
    }
    (jar, response).into_response()
}

/// The value of the last `Set-Cookie` for the session cookie already on
/// the response, if any. Empty means the handler removed the session.
fn session_cookie_value(response: &Response) -> Option<&str> {
    let prefix = format!("{SESSION_COOKIE}=");
    response
        .headers()
        .get_all(axum::http::header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next().map(str::trim))
        .filter_map(|pair| pair.strip_prefix(prefix.as_str()))
        .last()
}

fn identity_from(claims: &SessionClaims) -> CurrentUser {
    CurrentUser {
        user_id: claims.uid,
        username: claims.sub.clone(),
        remember_me: claims.remember,
        timeout_hint: claims.timeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_newer_than_stamp_is_fresh() {
        assert!(is_fresh(1_000_000, Some(999_999)));
    }

    #[test]
    fn test_token_at_or_before_stamp_is_stale() {
        // Strict comparison: equality means the modification wins.
        assert!(!is_fresh(1_000_000, Some(1_000_000)));
        assert!(!is_fresh(1_000_000, Some(1_000_001)));
    }

    #[test]
    fn test_missing_stamp_rides_the_grace_window() {
        // Substituted stamp is ten seconds before issuance.
        assert!(is_fresh(1_000_000, None));
        assert!(is_fresh(0, None));
    }
}
