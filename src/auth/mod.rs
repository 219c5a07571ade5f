//! Session handling
//!
//! Handles:
//! - Server-side session storage
//! - Signed session cookies
//! - Extractors for routes that require authentication

mod middleware;
pub mod session;

pub use middleware::{AuthRedirect, CurrentUser, MaybeUser};
pub use session::{
    MemoryStore, SESSION_COOKIE, Session, SessionStore, sign_session_id, verify_session_cookie,
};
