use axum_extra::extract::cookie::SameSite;

/// Server configuration loaded from environment variables.
///
/// All fields except the session secret have sensible defaults suitable
/// for local development. In production, override via environment
/// variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Session cookie configuration (secret, lifetimes, SameSite policy).
    pub session: SessionConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let session = SessionConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            session,
        }
    }
}

/// Configuration for session token signing and the session cookie.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// HMAC-SHA256 secret used to sign and verify session tokens.
    pub secret: String,
    /// Absolute session lifetime in days when "remember me" is set
    /// (default: 365).
    pub remember_expiry_days: i64,
    /// Absolute session lifetime in hours otherwise (default: 8).
    pub session_expiry_hours: i64,
    /// `SameSite` attribute on the session cookie. `None` requires the
    /// cookie to travel over HTTPS, which it is marked for anyway.
    pub same_site: SameSite,
}

/// Default remember-me lifetime in days.
const DEFAULT_REMEMBER_EXPIRY_DAYS: i64 = 365;
/// Default short-session lifetime in hours.
const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 8;

impl SessionConfig {
    /// Load session configuration from environment variables.
    ///
    /// | Env Var                 | Required | Default |
    /// |-------------------------|----------|---------|
    /// | `SESSION_SECRET`        | **yes**  | --      |
    /// | `SESSION_REMEMBER_DAYS` | no       | `365`   |
    /// | `SESSION_HOURS`         | no       | `8`     |
    /// | `SESSION_SAME_SITE`     | no       | `lax`   |
    ///
    /// # Panics
    ///
    /// Panics if `SESSION_SECRET` is not set or is empty, or if
    /// `SESSION_SAME_SITE` is not one of `strict`, `lax`, `none`.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("SESSION_SECRET").expect("SESSION_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "SESSION_SECRET must not be empty");

        let remember_expiry_days: i64 = std::env::var("SESSION_REMEMBER_DAYS")
            .unwrap_or_else(|_| DEFAULT_REMEMBER_EXPIRY_DAYS.to_string())
            .parse()
            .expect("SESSION_REMEMBER_DAYS must be a valid i64");

        let session_expiry_hours: i64 = std::env::var("SESSION_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_EXPIRY_HOURS.to_string())
            .parse()
            .expect("SESSION_HOURS must be a valid i64");

        let same_site = match std::env::var("SESSION_SAME_SITE")
            .unwrap_or_else(|_| "lax".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "strict" => SameSite::Strict,
            "lax" => SameSite::Lax,
            "none" => SameSite::None,
            other => panic!("SESSION_SAME_SITE must be strict, lax or none, got {other:?}"),
        };

        Self {
            secret,
            remember_expiry_days,
            session_expiry_hours,
            same_site,
        }
    }
}
