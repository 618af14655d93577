//! Session claims payload and its signed-token codec.
//!
//! The session token is an HS256-signed JWT carried in a cookie, not an
//! `Authorization` header. The claims struct has a fixed shape: absent
//! claims decode to typed defaults instead of being looked up by string
//! key at the call sites.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use stanchion_core::types::DbId;
use stanchion_db::models::user::User;

use crate::config::SessionConfig;

/// Claims embedded in every session token.
///
/// `uid`, `remember` and `timeout` fall back to zero/false when the claim
/// is missing. `iat_us` stays `None` when missing so validation can treat
/// an unstamped token as malformed rather than silently defaulting.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Subject -- the username at issuance time.
    #[serde(default)]
    pub sub: String,
    /// The user's internal database id. `0` means "unknown".
    #[serde(default)]
    pub uid: DbId,
    /// Issuance instant, UTC microseconds. Microsecond precision matches
    /// Postgres `TIMESTAMPTZ`, so freshness compares exactly against
    /// `users.updated_at`.
    #[serde(default)]
    pub iat_us: Option<i64>,
    /// Whether the session was issued with "remember me".
    #[serde(default)]
    pub remember: bool,
    /// Client-suggested session timeout hint. Not interpreted server-side;
    /// reset to 0 on renewal.
    #[serde(default)]
    pub timeout: u8,
    /// Absolute expiration (UTC Unix timestamp). Fixed at issuance; only a
    /// full re-issue moves it.
    pub exp: i64,
}

impl SessionClaims {
    /// Build the claims for a fresh session.
    ///
    /// Expiry is absolute: now + the remember-me lifetime when `remember`,
    /// otherwise now + the short session lifetime.
    pub fn issue(user: &User, remember: bool, timeout_hint: u8, config: &SessionConfig) -> Self {
        let now = chrono::Utc::now();
        let lifetime = if remember {
            chrono::Duration::days(config.remember_expiry_days)
        } else {
            chrono::Duration::hours(config.session_expiry_hours)
        };

        SessionClaims {
            sub: user.username.clone(),
            uid: user.id,
            iat_us: Some(now.timestamp_micros()),
            remember,
            timeout: timeout_hint,
            exp: (now + lifetime).timestamp(),
        }
    }
}

/// Sign a claims payload into the session token string.
pub fn encode_token(
    claims: &SessionClaims,
    config: &SessionConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(), // HS256
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify and decode a session token, returning the embedded claims.
///
/// Signature and `exp` are checked here; claim-level absences (`uid`,
/// `iat_us`, ...) decode into their defaults and are the caller's problem.
pub fn decode_token(
    token: &str,
    config: &SessionConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
