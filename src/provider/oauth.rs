//! Authorization-code exchange
//!
//! The only call that authenticates with the client credentials; all
//! later API calls use bearer tokens.

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use super::http::execute_json;
use crate::config::ProviderConfig;
use crate::error::Result;

/// Token endpoint request body
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    code: &'a str,
    grant_type: &'static str,
    redirect_uri: &'a str,
}

/// Token endpoint response
///
/// The provider returns more fields (token type, scopes); only the
/// access token is used here.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Build the `Basic` authorization header for the token exchange.
fn basic_auth_header(client_id: &str, client_secret: &str) -> String {
    let credentials = general_purpose::STANDARD.encode(format!("{}:{}", client_id, client_secret));
    format!("Basic {}", credentials)
}

/// Exchange an authorization code for an access token.
///
/// `redirect_uri` must be byte-identical to the one the authorize link
/// advertised; the provider rejects the exchange otherwise. Codes are
/// single-use at the provider: re-submitting a consumed code comes back
/// as a provider rejection, which propagates unchanged.
pub async fn exchange_code(
    client: &reqwest::Client,
    provider: &ProviderConfig,
    code: &str,
    redirect_uri: &str,
) -> Result<TokenResponse> {
    let request = client
        .post(provider.token_url())
        .header(
            reqwest::header::AUTHORIZATION,
            basic_auth_header(&provider.client_id, &provider.client_secret),
        )
        .json(&TokenRequest {
            code,
            grant_type: "authorization_code",
            redirect_uri,
        });

    execute_json(client, request).await
}
