//! Web routes
//!
//! Routes:
//! - GET /       login page with the provider authorize link
//! - GET /oauth  OAuth callback
//! - GET /app    schedule view (requires session)
//! - POST /logout

mod pages;

use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use serde::Deserialize;

use crate::AppState;
use crate::auth::{
    CurrentUser, MaybeUser, SESSION_COOKIE, Session, sign_session_id, verify_session_cookie,
};
use crate::error::AppError;
use crate::provider;
use crate::schedule::sort_by_period;

/// Create the application router
pub fn web_router() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page))
        .route("/oauth", get(oauth_callback))
        .route("/app", get(schedule_page))
        .route("/logout", post(logout))
}

/// GET /
///
/// Renders the login page. An already-authenticated caller is sent
/// straight to the schedule view.
async fn login_page(
    State(state): State<AppState>,
    MaybeUser(session): MaybeUser,
) -> Response {
    if session.is_some() {
        return Redirect::to("/app").into_response();
    }
    Html(pages::render_login(&state.config)).into_response()
}

/// Query parameters from the provider callback
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    /// Authorization code, absent when the flow was not started
    code: Option<String>,
}

/// GET /oauth
///
/// Handles the OAuth callback from the provider.
///
/// # Steps
/// 1. Exchange the authorization code for an access token
/// 2. Spend the token on one identity fetch
/// 3. Create a session holding the identity
/// 4. Set the signed session cookie
/// 5. Redirect to the schedule view
async fn oauth_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Result<Response, AppError> {
    // Arriving without a code means the flow was never started or the
    // user backed out; return to the login page instead of issuing a
    // guaranteed-failing exchange.
    let Some(code) = query.code else {
        return Ok(Redirect::to("/").into_response());
    };

    let redirect_uri = state.config.server.redirect_uri();
    let token = provider::exchange_code(
        &state.http_client,
        &state.config.provider,
        &code,
        &redirect_uri,
    )
    .await?;

    // Token-once: one identity fetch, then the user token is dropped.
    // Schedule fetches run on the service-level token.
    let identity = provider::fetch_identity(
        &state.http_client,
        &state.config.provider,
        &token.access_token,
    )
    .await?;

    tracing::info!(user_id = %identity.id, kind = ?identity.kind, "User authenticated");

    let session = Session::new(identity, state.config.auth.session_max_age);
    let session_id = state.sessions.insert(session).await;
    let cookie_value = sign_session_id(&session_id, &state.config.auth.session_secret)?;

    let cookie = Cookie::build((SESSION_COOKIE, cookie_value))
        .path("/")
        .http_only(true)
        .secure(state.config.should_use_secure_cookies())
        .build();

    Ok((jar.add(cookie), Redirect::to("/app")).into_response())
}

/// GET /app
///
/// Fetches, sorts, and renders the caller's schedule. Without a
/// session, `CurrentUser` redirects to the login page before any
/// provider call is made.
async fn schedule_page(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
) -> Result<Html<String>, AppError> {
    let entries = provider::fetch_schedule(
        &state.http_client,
        &state.config.provider,
        &session.identity,
    )
    .await?;
    let entries = sort_by_period(entries)?;

    Ok(Html(pages::render_schedule(&session.identity, &entries)))
}

/// POST /logout
///
/// Drops the server-side session and clears the cookie.
async fn logout(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(id) = verify_session_cookie(cookie.value(), &state.config.auth.session_secret) {
            state.sessions.remove(&id).await;
        }
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    (jar.remove(removal), Redirect::to("/")).into_response()
}
