use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Authentication failed: {message}")]
    AuthError { message: String },

    #[error("Upstream '{endpoint}' failed: {message}")]
    UpstreamError { endpoint: String, message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProxyError {
    /// 對應到回應的 HTTP 狀態碼
    pub fn status_code(&self) -> u16 {
        match self {
            ProxyError::ValidationError { .. } => 400,
            _ => 500,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ProxyError::ValidationError {
            message: message.into(),
        }
    }

    pub fn missing_parameter(name: &str) -> Self {
        Self::validation(format!("missing required parameter: {}", name))
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;
