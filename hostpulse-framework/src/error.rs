//! Error types for the producer framework.

use rdkafka::error::KafkaError;
use thiserror::Error;

/// Result type alias using [`ProducerError`].
pub type Result<T> = std::result::Result<T, ProducerError>;

/// Errors that can occur in a producer.
#[derive(Error, Debug)]
pub enum ProducerError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Kafka connection error.
    #[error("Kafka connection error: {0}")]
    KafkaConnection(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Publishing error.
    #[error("Failed to publish to {topic}: {message}")]
    Publish { topic: String, message: String },

    /// The client's local send queue is full.
    #[error("Send queue full for topic {topic}")]
    QueueFull { topic: String },

    /// Outstanding deliveries did not complete before the flush timeout.
    #[error("Failed to flush pending deliveries: {0}")]
    Flush(String),

    /// Metrics acquisition error.
    #[error("Failed to collect metrics: {0}")]
    Metrics(String),

    /// Worker error.
    #[error("Worker error: {0}")]
    Worker(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProducerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }

    /// Create a metrics acquisition error.
    pub fn metrics(msg: impl Into<String>) -> Self {
        Self::Metrics(msg.into())
    }

    /// Create a worker error.
    pub fn worker(msg: impl Into<String>) -> Self {
        Self::Worker(msg.into())
    }
}

impl From<hostpulse_common::Error> for ProducerError {
    fn from(err: hostpulse_common::Error) -> Self {
        match err {
            hostpulse_common::Error::Config(msg) => Self::Config(msg),
            hostpulse_common::Error::Connect(msg) => Self::KafkaConnection(msg),
            hostpulse_common::Error::Kafka(e) => Self::KafkaConnection(e.to_string()),
            hostpulse_common::Error::Json(e) => Self::Serialization(e.to_string()),
            hostpulse_common::Error::Io(e) => Self::Io(e),
            other @ hostpulse_common::Error::InvalidRecord { .. } => {
                Self::Serialization(other.to_string())
            }
        }
    }
}

impl From<KafkaError> for ProducerError {
    fn from(err: KafkaError) -> Self {
        Self::KafkaConnection(err.to_string())
    }
}

impl From<json5::Error> for ProducerError {
    fn from(err: json5::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}
