#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::domain::model::Credentials;
use crate::utils::error::{ProxyError, Result};
use crate::utils::validation::{validate_range, validate_required_field, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::env;

pub const CLIENT_ID_VAR: &str = "PROKERALA_CLIENT_ID";
pub const CLIENT_SECRET_VAR: &str = "PROKERALA_CLIENT_SECRET";

/// Provider endpoints and outbound call limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_base_url: String,
    pub token_url: String,
    pub request_timeout_seconds: u64,
    pub token_safety_margin_seconds: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.prokerala.com".to_string(),
            token_url: "https://api.prokerala.com/token".to_string(),
            request_timeout_seconds: 30,
            token_safety_margin_seconds: 300,
        }
    }
}

impl ProviderConfig {
    /// 預設值加上環境變數覆寫
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(url) = non_empty_var("PROKERALA_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(url) = non_empty_var("PROKERALA_TOKEN_URL") {
            self.token_url = url;
        }
        if let Some(timeout) = non_empty_var("PROKERALA_TIMEOUT_SECONDS") {
            self.request_timeout_seconds =
                timeout
                    .parse()
                    .map_err(|_| ProxyError::InvalidConfigValueError {
                        field: "PROKERALA_TIMEOUT_SECONDS".to_string(),
                        value: timeout.clone(),
                        reason: "must be a whole number of seconds".to_string(),
                    })?;
        }
        Ok(self)
    }
}

impl Validate for ProviderConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_base_url", &self.api_base_url)?;
        validate_url("token_url", &self.token_url)?;
        validate_range("request_timeout_seconds", self.request_timeout_seconds, 1, 300)?;
        validate_range(
            "token_safety_margin_seconds",
            self.token_safety_margin_seconds,
            0,
            3599,
        )?;

        tracing::debug!("✅ Provider configuration validation passed");
        Ok(())
    }
}

/// Reads the client credentials from the environment.
pub fn credentials_from_env() -> Result<Credentials> {
    let client_id = non_empty_var(CLIENT_ID_VAR);
    let client_secret = non_empty_var(CLIENT_SECRET_VAR);

    let client_id = validate_required_field(CLIENT_ID_VAR, &client_id)?;
    let client_secret = validate_required_field(CLIENT_SECRET_VAR, &client_secret)?;

    Ok(Credentials::new(client_id.clone(), client_secret.clone()))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
