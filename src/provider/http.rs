//! Outbound HTTP execution
//!
//! Every provider call goes through [`execute_json`], which collapses
//! the possible outcomes into one error channel: transport failures,
//! non-success statuses, and parse failures all come back as `AppError`.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};

/// Error body shape the provider uses for non-success responses.
#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: Option<String>,
    error_description: Option<String>,
}

/// Perform an outbound call and parse the 2xx body as JSON.
///
/// Non-success statuses become [`AppError::Provider`] with a message
/// taken from the response body's `error` field. Transport failures
/// become [`AppError::Transport`]. Every failure is logged with the
/// request URL before being returned.
pub(crate) async fn execute_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    builder: reqwest::RequestBuilder,
) -> Result<T> {
    let request = builder.build()?;
    let url = request.url().clone();

    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(error) => {
            tracing::error!(%url, %error, "Provider request failed to complete");
            return Err(AppError::Transport(error));
        }
    };

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let message = error_message_from_body(status.as_u16(), &body);
        tracing::error!(%url, status = status.as_u16(), %message, "Provider returned an error");
        return Err(AppError::Provider {
            status: status.as_u16(),
            message,
        });
    }

    match response.json::<T>().await {
        Ok(parsed) => Ok(parsed),
        Err(error) => {
            tracing::error!(%url, %error, "Provider response body failed to parse");
            Err(AppError::Transport(error))
        }
    }
}

/// Derive a human-readable message from a non-success response body.
///
/// Prefers the body's `error` field, then `error_description`, then the
/// raw body text, and finally the bare status code. A provider response
/// with no usable body still produces an informative message.
fn error_message_from_body(status: u16, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ProviderErrorBody>(body) {
        if let Some(error) = parsed.error.filter(|e| !e.trim().is_empty()) {
            return error;
        }
        if let Some(description) = parsed.error_description.filter(|d| !d.trim().is_empty()) {
            return description;
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    format!("HTTP {}", status)
}
