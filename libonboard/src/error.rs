//! Error types for Onboard

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OnboardError>;

#[derive(Error, Debug)]
pub enum OnboardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("No active user")]
    NoActiveUser,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl OnboardError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            OnboardError::InvalidInput(_) => 3,
            OnboardError::NoActiveUser => 2,
            OnboardError::Config(_) => 1,
            OnboardError::Storage(_) => 1,
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
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Corrupt data under key '{key}': {detail}")]
    Corrupt { key: String, detail: String },
}
