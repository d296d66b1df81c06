use thiserror::Error;

/// Top-level error type for the Drover workspace.
///
/// Covers the ambient failures (configuration, I/O, serialization) shared by
/// every crate. Domain rejections live in `drover-engine`'s own error enums.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DroverError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for DroverError {
    fn from(err: toml::de::Error) -> Self {
        DroverError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for DroverError {
    fn from(err: toml::ser::Error) -> Self {
        DroverError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for DroverError {
    fn from(err: serde_json::Error) -> Self {
        DroverError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Drover operations.
pub type Result<T> = std::result::Result<T, DroverError>;
