use rdkafka::error::KafkaError;
use thiserror::Error;

/// Common error type for hostpulse components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Kafka connection error: {0}")]
    Connect(String),

    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record field '{field}': {message}")]
    InvalidRecord { field: &'static str, message: String },
}

impl Error {
    /// Create an invalid record error for the given field.
    pub fn invalid_record(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            field,
            message: message.into(),
        }
    }
}

/// Result type alias using hostpulse's Error.
pub type Result<T> = std::result::Result<T, Error>;
