//! Error types for voxbridge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    // Configuration errors
    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Audio pipeline errors
    #[error("Audio decode failed: {message}")]
    Decode { message: String },

    // STT transport errors
    #[error("STT transport error: {message}")]
    Transport { message: String },

    #[error("STT session setup failed: {message}")]
    SessionSetup { message: String },

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, BridgeError>;
