//! Session cookie issuance and removal.
//!
//! The signed token travels in an `HttpOnly` + `Secure` cookie scoped to
//! the whole site. Expiry is absolute: the cookie's `Max-Age` mirrors the
//! token's `exp` policy and nothing extends either implicitly; renewal and
//! re-login replace the cookie wholesale.

use axum_extra::extract::cookie::{Cookie, CookieJar};
use stanchion_db::models::user::User;

use crate::auth::claims::{encode_token, SessionClaims};
use crate::config::SessionConfig;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "stanchion_session";

/// Issue a fresh session for `user` and add its cookie to the jar.
pub fn sign_in(
    jar: CookieJar,
    user: &User,
    remember: bool,
    timeout_hint: u8,
    config: &SessionConfig,
) -> Result<CookieJar, jsonwebtoken::errors::Error> {
    let claims = SessionClaims::issue(user, remember, timeout_hint, config);
    attach(jar, &claims, config)
}

/// Encode already-built claims and add the session cookie to the jar.
///
/// Used directly by validator-driven renewal, where the claims are derived
/// from a fresh user row rather than a login request.
pub fn attach(
    jar: CookieJar,
    claims: &SessionClaims,
    config: &SessionConfig,
) -> Result<CookieJar, jsonwebtoken::errors::Error> {
    let token = encode_token(claims, config)?;
    let max_age = if claims.remember {
        time::Duration::days(config.remember_expiry_days)
    } else {
        time::Duration::hours(config.session_expiry_hours)
    };

    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(config.same_site)
        .max_age(max_age)
        .build();

    Ok(jar.add(cookie))
}

/// Purge the session cookie. Idempotent: the expired removal cookie is
/// added unconditionally, so clients that never sent a session are still
/// told to drop any they might hold.
pub fn sign_out(jar: CookieJar) -> CookieJar {
    let removal = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    jar.add(removal)
}
