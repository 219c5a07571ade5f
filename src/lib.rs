//! Bellboard - a school bell schedule viewer
//!
//! Authenticates a user through an education-data provider's OAuth
//! flow, fetches that user's class schedule, and renders it.
//!
//! # Request flow
//!
//! ```text
//! GET /            login page with provider authorize link
//!       │
//! GET /oauth?code  exchange code → access token (Basic auth POST)
//!       │          fetch identity with the token (token-once)
//!       │          store identity in a server-side session
//! GET /app         fetch sections with the service token, sort, render
//! ```
//!
//! # Modules
//!
//! - `web`: HTTP handlers and HTML views
//! - `provider`: education-data provider client (OAuth + API)
//! - `schedule`: schedule ordering
//! - `auth`: sessions, signed cookies, extractors
//! - `config`: configuration management
//! - `error`: error types

pub mod auth;
pub mod config;
pub mod error;
pub mod provider;
pub mod schedule;
pub mod web;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// This struct is cloned for each request and contains shared
/// resources like the session store and the outbound HTTP client.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Server-side session store (in-memory)
    pub sessions: Arc<dyn auth::SessionStore>,

    /// HTTP client for provider calls
    pub http_client: Arc<reqwest::Client>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        // A dead provider must not hang requests forever.
        let http_client = reqwest::Client::builder()
            .user_agent("Bellboard/0.1.0")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| error::AppError::Internal(e.into()))?;

        Ok(Self {
            config: Arc::new(config),
            sessions: Arc::new(auth::MemoryStore::new()),
            http_client: Arc::new(http_client),
        })
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::Router;
    use tower_http::{compression::CompressionLayer, trace::TraceLayer};

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .merge(web::web_router())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
