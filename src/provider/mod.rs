//! Education-data provider client
//!
//! Handles:
//! - Outbound request execution and error normalization
//! - Authorization-code exchange at the token endpoint
//! - Identity and schedule fetches

mod api;
mod http;
mod oauth;

pub use api::{Identity, ScheduleEntry, Section, UserKind, fetch_identity, fetch_schedule};
pub use oauth::{TokenResponse, exchange_code};
