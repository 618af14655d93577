//! Request identity extractors over the validated session.
//!
//! The session validator stores a [`CurrentUser`] in request extensions
//! when (and only when) the request carried a live session. Handlers pick
//! it up through these extractors; no handler re-reads the cookie.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use stanchion_core::types::DbId;

use crate::routes::auth::LOGIN_PATH;

/// Authenticated identity resolved by the session validator.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(user: CurrentUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// The user's internal database id.
    pub user_id: DbId,
    /// Username at issuance (or renewal) time.
    pub username: String,
    /// Whether the session was issued with "remember me".
    pub remember_me: bool,
    /// Client-provided session timeout hint; zero after renewal.
    pub timeout_hint: u8,
}

/// Rejection for unauthenticated requests: the forced re-login outcome.
#[derive(Debug)]
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        // 303 so a rejected POST turns into a GET of the login page.
        Redirect::to(LOGIN_PATH).into_response()
    }
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(LoginRedirect)
    }
}

/// Identity that never rejects; accessors default for anonymous requests.
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl OptionalUser {
    pub fn is_authenticated(&self) -> bool {
        self.0.is_some()
    }

    /// `0` means unauthenticated.
    pub fn user_id(&self) -> DbId {
        self.0.as_ref().map_or(0, |u| u.user_id)
    }

    pub fn username(&self) -> &str {
        self.0.as_ref().map_or("", |u| u.username.as_str())
    }

    pub fn is_remember_me(&self) -> bool {
        self.0.as_ref().is_some_and(|u| u.remember_me)
    }

    pub fn session_timeout_hint(&self) -> u8 {
        self.0.as_ref().map_or(0, |u| u.timeout_hint)
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(parts.extensions.get::<CurrentUser>().cloned()))
    }
}
