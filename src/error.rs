use thiserror::Error;

use crate::retroachievements::SampleError;

/// Result type alias for TrophyTroopa operations
pub type Result<T> = std::result::Result<T, TroopaError>;

/// Errors that can occur during TrophyTroopa operations
#[derive(Error, Debug)]
pub enum TroopaError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Missing required configuration
    #[error("{0}")]
    ConfigMissing(String),

    /// Remote API answered with a non-success status
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("Failed to write config file: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Environment variable error
    #[error("Environment error: {0}")]
    Env(#[from] std::env::VarError),

    /// Flashpoint ids are 36-character UUIDs
    #[error("Invalid game id: {0}")]
    InvalidGameId(String),

    /// No system matched the query
    #[error("No system matches '{0}'")]
    UnknownSystem(String),

    /// Flashpoint collection not configured
    #[error("Unknown flashpoint collection: {0}")]
    UnknownCollection(String),

    /// Random selection could not be satisfied
    #[error(transparent)]
    Sample(#[from] SampleError),
}

impl TroopaError {
    /// Create an API error from HTTP status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a config missing error with helpful message
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::ConfigMissing(message.into())
    }

    /// Process exit code for the CLI
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::ConfigMissing(_) | Self::Toml(_) => 2,
            _ => 1,
        }
    }
}
