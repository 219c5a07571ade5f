//! Session management
//!
//! The cookie carries only an opaque, HMAC-signed session identifier.
//! Session content lives server-side in the store.

use axum::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::provider::Identity;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "session";

/// Server-side session data
///
/// Holds the identity fetched once at login (token-once pattern); the
/// per-user access token is discarded after that fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Identity returned by the provider at login
    pub identity: Identity,
    /// When session was created
    pub created_at: DateTime<Utc>,
    /// When session expires
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(identity: Identity, max_age_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            identity,
            created_at: now,
            expires_at: now + Duration::seconds(max_age_seconds),
        }
    }

    /// Check if session is expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Server-side session storage
///
/// In-memory for this deployment; the trait keeps an external backend
/// swappable without touching the handlers.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a session and return its freshly minted identifier.
    async fn insert(&self, session: Session) -> String;
    /// Look up a live session. Expired sessions read as absent.
    async fn get(&self, id: &str) -> Option<Session>;
    /// Drop a session, if present.
    async fn remove(&self, id: &str);
}

/// In-memory session store
///
/// Sessions do not survive a process restart.
#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn insert(&self, session: Session) -> String {
        let id = new_session_id();
        self.sessions.write().await.insert(id.clone(), session);
        id
    }

    async fn get(&self, id: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(id).cloned()?;
        if session.is_expired() {
            // Evict on read; there is no background sweeper.
            self.sessions.write().await.remove(id);
            return None;
        }
        Some(session)
    }

    async fn remove(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }
}

/// Generate an opaque session identifier (256 bits, URL-safe base64).
fn new_session_id() -> String {
    use base64::{Engine as _, engine::general_purpose};
    use rand::RngCore;

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Sign a session identifier for the cookie
///
/// Cookie value format: `{id}.{base64(hmac_sha256(id))}`
pub fn sign_session_id(id: &str, secret: &str) -> Result<String, AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(e.to_string()))?;
    mac.update(id.as_bytes());
    let signature = mac.finalize().into_bytes();
    let signature_b64 = general_purpose::URL_SAFE_NO_PAD.encode(signature);

    Ok(format!("{}.{}", id, signature_b64))
}

/// Verify a cookie value and return the embedded session identifier
///
/// # Errors
/// Returns error if the signature is invalid or the value is malformed
pub fn verify_session_cookie(value: &str, secret: &str) -> Result<String, AppError> {
    use base64::{Engine as _, engine::general_purpose};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    let parts: Vec<&str> = value.split('.').collect();
    if parts.len() != 2 {
        return Err(AppError::Unauthorized);
    }

    let id = parts[0];
    let signature_b64 = parts[1];

    type HmacSha256 = Hmac<Sha256>;
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AppError::Config(e.to_string()))?;
    mac.update(id.as_bytes());

    let expected_signature = general_purpose::URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| AppError::Unauthorized)?;

    mac.verify_slice(&expected_signature)
        .map_err(|_| AppError::InvalidSignature)?;

    Ok(id.to_string())
}
