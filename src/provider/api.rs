//! Identity and schedule endpoints
//!
//! Both endpoints wrap their payload in a `data` envelope.

use serde::{Deserialize, Serialize};

use super::http::execute_json;
use crate::config::ProviderConfig;
use crate::error::Result;

/// Provider response envelope
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

/// The authenticated user, as the provider reports it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: UserKind,
    pub name: String,
}

/// User category, which selects the sections collection to query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Student,
    Teacher,
}

impl UserKind {
    /// Path segment for the sections endpoint
    pub fn collection(self) -> &'static str {
        match self {
            UserKind::Student => "students",
            UserKind::Teacher => "teachers",
        }
    }
}

/// One schedule entry as returned by the sections endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub data: Section,
}

/// Section payload
///
/// The provider sends more fields per section; only the ones the
/// schedule view renders are kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub period: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Fetch the caller's identity with a freshly exchanged user token.
pub async fn fetch_identity(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    access_token: &str,
) -> Result<Identity> {
    let request = client.get(provider.me_url()).bearer_auth(access_token);
    let envelope: Envelope<Identity> = execute_json(client, request).await?;
    Ok(envelope.data)
}

/// Fetch the schedule section list for an identity.
///
/// Uses the service-level API token, not a per-user token; the user's
/// token was already spent on the identity fetch.
pub async fn fetch_schedule(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    identity: &Identity,
) -> Result<Vec<ScheduleEntry>> {
    let url = provider.sections_url(identity.kind.collection(), &identity.id);
    let request = client.get(url).bearer_auth(&provider.api_token);
    let envelope: Envelope<Vec<ScheduleEntry>> = execute_json(client, request).await?;
    Ok(envelope.data)
}
