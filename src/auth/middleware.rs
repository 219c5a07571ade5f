//! Authentication extractors
//!
//! Routes that require a session do not respond 401; an absent or
//! invalid session sends the caller back to the login page.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use super::session::{SESSION_COOKIE, Session, verify_session_cookie};
use crate::AppState;

/// Rejection that redirects unauthenticated callers to the login page
#[derive(Debug)]
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/").into_response()
    }
}

/// Extractor for the current authenticated session
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(session): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", session.identity.name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let session = lookup_session(parts, &state).await.ok_or(AuthRedirect)?;
        Ok(CurrentUser(session))
    }
}

/// Optional session extractor
///
/// Returns None if not authenticated, instead of redirecting.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(MaybeUser(lookup_session(parts, &state).await))
    }
}

/// Resolve the session for a request, if any.
///
/// A missing cookie, a bad signature, an unknown id, and an expired
/// session all read the same way: no session.
async fn lookup_session(parts: &Parts, state: &AppState) -> Option<Session> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(SESSION_COOKIE)?;
    let id = verify_session_cookie(cookie.value(), &state.config.auth.session_secret).ok()?;
    state.sessions.get(&id).await
}
