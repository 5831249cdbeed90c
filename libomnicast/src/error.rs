//! Error types for Omnicast

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OmnicastError>;

#[derive(Error, Debug)]
pub enum OmnicastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl OmnicastError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            OmnicastError::InvalidInput(_) => 3,
            OmnicastError::Provider(_) => 1,
            OmnicastError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Normalized failure of a single provider call.
///
/// The `Display` output is what ends up in a result's `error` field, so every
/// variant renders a non-empty, provider-specific message.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Credentials or endpoint missing; raised before any network call
    #[error("{0} not configured")]
    NotConfigured(String),

    #[error("{0}")]
    Authentication(String),

    /// Provider answered with a non-success HTTP status
    #[error("{provider} error {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{0}")]
    Network(String),

    #[error("{0}")]
    InvalidResponse(String),
}
