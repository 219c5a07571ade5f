//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)
//!
//! Provider credentials and the session secret have NO defaults:
//! deployments must supply them via file or environment, and startup
//! fails if any is missing or blank.

use serde::Deserialize;
use std::net::IpAddr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Externally visible base URL (e.g., "https://bells.example.com")
    ///
    /// Used to build the OAuth redirect URI, which must match the one
    /// registered with the provider byte for byte.
    pub public_url: String,
}

impl ServerConfig {
    /// The OAuth callback URL advertised to the provider.
    ///
    /// The same value is used in the authorize link and in the token
    /// exchange; the provider rejects the exchange if they differ.
    pub fn redirect_uri(&self) -> String {
        format!("{}/oauth", self.public_url.trim_end_matches('/'))
    }
}

/// Education-data provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// API base URL, also hosting the token endpoint
    /// (e.g., "https://api.provider.com")
    pub base_url: String,
    /// Authorization page the login view links to
    /// (e.g., "https://provider.com/oauth/authorize")
    pub authorize_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// District/organization identifier passed on the authorize link
    pub district_id: String,
    /// Service-level API token used for schedule fetches
    pub api_token: String,
}

impl ProviderConfig {
    pub fn token_url(&self) -> String {
        format!("{}/oauth/tokens", self.base_url.trim_end_matches('/'))
    }

    pub fn me_url(&self) -> String {
        format!("{}/me", self.base_url.trim_end_matches('/'))
    }

    pub fn sections_url(&self, user_collection: &str, user_id: &str) -> String {
        format!(
            "{}/v1.1/{}/{}/sections",
            self.base_url.trim_end_matches('/'),
            user_collection,
            user_id
        )
    }
}

/// Session/authentication configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Session cookie signing secret (32+ bytes)
    pub session_secret: String,
    /// Session max age in seconds (default: 86400 = 24h)
    pub session_max_age: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (BELLBOARD_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.public_url", "http://localhost:5000")?
            .set_default("auth.session_max_age", 86400)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (BELLBOARD_*)
            .add_source(
                Environment::with_prefix("BELLBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.public_url.starts_with("https://")
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_SESSION_SECRET_BYTES: usize = 32;

        if self.auth.session_secret.as_bytes().len() < MIN_SESSION_SECRET_BYTES {
            return Err(crate::error::AppError::Config(format!(
                "auth.session_secret must be at least {} bytes",
                MIN_SESSION_SECRET_BYTES
            )));
        }

        if self.auth.session_max_age <= 0 {
            return Err(crate::error::AppError::Config(
                "auth.session_max_age must be greater than 0".to_string(),
            ));
        }

        for (key, value) in [
            ("provider.client_id", &self.provider.client_id),
            ("provider.client_secret", &self.provider.client_secret),
            ("provider.district_id", &self.provider.district_id),
            ("provider.api_token", &self.provider.api_token),
        ] {
            if value.trim().is_empty() {
                return Err(crate::error::AppError::Config(format!(
                    "{} must not be empty",
                    key
                )));
            }
        }

        for (key, value) in [
            ("provider.base_url", &self.provider.base_url),
            ("provider.authorize_url", &self.provider.authorize_url),
            ("server.public_url", &self.server.public_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                crate::error::AppError::Config(format!("{} is not a valid URL: {}", key, e))
            })?;
        }

        if !self.should_use_secure_cookies() {
            if !is_local_public_url(&self.server.public_url) {
                return Err(crate::error::AppError::Config(
                    "server.public_url must be https for non-local deployments".to_string(),
                ));
            }
            tracing::warn!(
                public_url = %self.server.public_url,
                "Using insecure session cookies for local development"
            );
        }

        Ok(())
    }
}

fn is_local_public_url(public_url: &str) -> bool {
    let host = match url::Url::parse(public_url) {
        Ok(url) => match url.host_str() {
            Some(host) => host.trim_end_matches('.').to_ascii_lowercase(),
            None => return false,
        },
        Err(_) => return false,
    };

    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}
