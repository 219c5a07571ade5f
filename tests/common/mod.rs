//! Common test utilities for E2E tests
//!
//! Spawns the real application router against an in-process mock of
//! the education-data provider, so tests exercise the full outbound
//! path without network access.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use bellboard::{AppState, config};
use tokio::net::TcpListener;

/// Authorization code the mock provider accepts exactly once per shape
pub const VALID_CODE: &str = "VALIDCODE123";
/// Access token the mock provider issues for the valid code
pub const ISSUED_TOKEN: &str = "tok_abc";
/// Service-level token the mock provider expects on sections fetches
pub const SERVICE_TOKEN: &str = "test-api-token";

const CLIENT_ID: &str = "test-client-id";
const CLIENT_SECRET: &str = "test-client-secret";
const PUBLIC_URL: &str = "http://app.test";

/// Observable state of the mock provider
#[derive(Default)]
pub struct ProviderState {
    pub token_calls: AtomicUsize,
    pub me_calls: AtomicUsize,
    pub sections_calls: AtomicUsize,
    /// Authorization header seen on the last /me request
    pub last_me_authorization: Mutex<Option<String>>,
    /// Authorization header seen on the last sections request
    pub last_sections_authorization: Mutex<Option<String>>,
    /// Section entries returned by the sections endpoint
    pub sections: Mutex<serde_json::Value>,
    /// Force the sections endpoint to fail with a 500
    pub fail_sections: AtomicBool,
}

/// In-process mock of the education-data provider
pub struct MockProvider {
    pub base_url: String,
    pub state: Arc<ProviderState>,
}

impl MockProvider {
    pub async fn spawn() -> Self {
        let state = Arc::new(ProviderState {
            sections: Mutex::new(default_sections()),
            ..ProviderState::default()
        });

        let app = Router::new()
            .route("/oauth/tokens", post(token_endpoint))
            .route("/me", get(me_endpoint))
            .route("/v1.1/:collection/:id/sections", get(sections_endpoint))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Total outbound calls the application has made to the provider
    pub fn total_calls(&self) -> usize {
        self.state.token_calls.load(Ordering::SeqCst)
            + self.state.me_calls.load(Ordering::SeqCst)
            + self.state.sections_calls.load(Ordering::SeqCst)
    }

    /// Replace the section entries the sections endpoint returns
    pub fn set_sections(&self, sections: serde_json::Value) {
        *self.state.sections.lock().unwrap() = sections;
    }

    pub fn fail_sections(&self) {
        self.state.fail_sections.store(true, Ordering::SeqCst);
    }
}

fn default_sections() -> serde_json::Value {
    serde_json::json!([
        {"data": {"name": "Chemistry", "period": "3"}},
        {"data": {"name": "Algebra", "period": "1"}},
        {"data": {"name": "English", "period": "2"}},
    ])
}

fn expected_basic_header() -> String {
    use base64::{Engine as _, engine::general_purpose};
    format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("{}:{}", CLIENT_ID, CLIENT_SECRET))
    )
}

fn authorization_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

async fn token_endpoint(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.token_calls.fetch_add(1, Ordering::SeqCst);

    let expected_basic = expected_basic_header();
    let expected_redirect = format!("{}/oauth", PUBLIC_URL);

    let basic_ok = authorization_header(&headers).as_deref() == Some(expected_basic.as_str());
    let code_ok = body.get("code").and_then(|v| v.as_str()) == Some(VALID_CODE);
    let grant_ok =
        body.get("grant_type").and_then(|v| v.as_str()) == Some("authorization_code");
    let redirect_ok =
        body.get("redirect_uri").and_then(|v| v.as_str()) == Some(expected_redirect.as_str());

    if basic_ok && code_ok && grant_ok && redirect_ok {
        (
            StatusCode::OK,
            Json(serde_json::json!({"access_token": ISSUED_TOKEN, "token_type": "bearer"})),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "invalid_grant"})),
        )
    }
}

async fn me_endpoint(
    State(state): State<Arc<ProviderState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.me_calls.fetch_add(1, Ordering::SeqCst);

    let authorization = authorization_header(&headers);
    *state.last_me_authorization.lock().unwrap() = authorization.clone();

    let expected_bearer = format!("Bearer {}", ISSUED_TOKEN);
    if authorization.as_deref() == Some(expected_bearer.as_str()) {
        (
            StatusCode::OK,
            Json(serde_json::json!({
                "data": {"id": "u1", "type": "student", "name": "Jane Doe"}
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "invalid_token"})),
        )
    }
}

async fn sections_endpoint(
    State(state): State<Arc<ProviderState>>,
    Path((collection, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    state.sections_calls.fetch_add(1, Ordering::SeqCst);

    let authorization = authorization_header(&headers);
    *state.last_sections_authorization.lock().unwrap() = authorization.clone();

    if state.fail_sections.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "server_error"})),
        );
    }

    let expected_bearer = format!("Bearer {}", SERVICE_TOKEN);
    if authorization.as_deref() != Some(expected_bearer.as_str()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"error": "invalid_token"})),
        );
    }

    if collection != "students" || id != "u1" {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "unknown user"})),
        );
    }

    let sections = state.sections.lock().unwrap().clone();
    (StatusCode::OK, Json(serde_json::json!({"data": sections})))
}

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub provider: MockProvider,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server backed by a fresh mock provider
    pub async fn new() -> Self {
        let provider = MockProvider::spawn().await;

        // Create test configuration
        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
                public_url: PUBLIC_URL.to_string(),
            },
            provider: config::ProviderConfig {
                base_url: provider.base_url.clone(),
                authorize_url: format!("{}/oauth/authorize", provider.base_url),
                client_id: CLIENT_ID.to_string(),
                client_secret: CLIENT_SECRET.to_string(),
                district_id: "test-district".to_string(),
                api_token: SERVICE_TOKEN.to_string(),
            },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                session_max_age: 86_400,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        // Initialize app state
        let state = AppState::new(config).unwrap();

        // HTTP client that never follows redirects, so tests can
        // observe Location headers directly.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = bellboard::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            provider,
            client,
        }
    }

    /// Get base URL for requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Run the callback with the valid code and return the session
    /// cookie (as a `Cookie` request-header value).
    pub async fn login(&self) -> String {
        let response = self
            .client
            .get(self.url(&format!("/oauth?code={}", VALID_CODE)))
            .send()
            .await
            .expect("callback request succeeds");

        assert!(
            response.status().is_redirection(),
            "expected redirect after login, got {}",
            response.status()
        );

        let set_cookie = response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .expect("set-cookie header after login");

        set_cookie
            .split(';')
            .next()
            .expect("cookie name=value pair")
            .to_string()
    }
}
