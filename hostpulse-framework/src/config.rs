//! Configuration traits and utilities.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{ProducerError, Result};
use crate::{KafkaConfig, LoggingConfig};

/// Trait for producer configuration types.
///
/// Implement this trait for your producer's configuration struct to get
/// automatic loading, validation, and access to common config fields.
///
/// # Example
///
/// ```ignore
/// use serde::Deserialize;
/// use hostpulse_framework::{KafkaConfig, LoggingConfig, ProducerConfig};
///
/// #[derive(Debug, Deserialize)]
/// pub struct MyProducerConfig {
///     pub kafka: KafkaConfig,
///     pub logging: LoggingConfig,
///     pub topic: String,
/// }
///
/// impl ProducerConfig for MyProducerConfig {
///     fn kafka(&self) -> &KafkaConfig {
///         &self.kafka
///     }
///
///     fn logging(&self) -> &LoggingConfig {
///         &self.logging
///     }
///
///     fn topic(&self) -> &str {
///         &self.topic
///     }
///
///     fn flush_timeout_ms(&self) -> u64 {
///         10_000
///     }
/// }
/// ```
pub trait ProducerConfig: Sized + DeserializeOwned {
    /// Get the Kafka connection configuration.
    fn kafka(&self) -> &KafkaConfig;

    /// Get the logging configuration.
    fn logging(&self) -> &LoggingConfig;

    /// Get the topic records are published to.
    fn topic(&self) -> &str;

    /// How long to wait for outstanding deliveries on shutdown.
    fn flush_timeout_ms(&self) -> u64;

    /// Validate the configuration.
    ///
    /// Called automatically after loading. The default checks the Kafka
    /// settings and topic; override to add custom validation and call
    /// [`validate_common`] from it.
    fn validate(&self) -> Result<()> {
        validate_common(self)
    }

    /// Load configuration from a file path.
    ///
    /// Supports JSON5 format. Calls [`validate`](Self::validate) after loading.
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ProducerError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string and validate it.
    fn parse(content: &str) -> Result<Self> {
        let config: Self = json5::from_str(content)?;

        config.validate()?;

        Ok(config)
    }
}

/// Checks shared by every producer configuration.
pub fn validate_common<C: ProducerConfig>(config: &C) -> Result<()> {
    let kafka = config.kafka();

    if kafka.bootstrap_servers.trim().is_empty() {
        return Err(ProducerError::validation("kafka.bootstrap_servers must not be empty"));
    }
    if kafka.client_id.trim().is_empty() {
        return Err(ProducerError::validation("kafka.client_id must not be empty"));
    }
    if kafka.message_timeout_ms == 0 {
        return Err(ProducerError::validation("kafka.message_timeout_ms must be > 0"));
    }
    if kafka.connect_timeout_ms == 0 {
        return Err(ProducerError::validation("kafka.connect_timeout_ms must be > 0"));
    }
    if kafka.queue_buffering_max_messages == 0 {
        return Err(ProducerError::validation(
            "kafka.queue_buffering_max_messages must be > 0",
        ));
    }
    if config.topic().trim().is_empty() {
        return Err(ProducerError::validation("topic must not be empty"));
    }
    if config.flush_timeout_ms() == 0 {
        return Err(ProducerError::validation("flush_timeout_ms must be > 0"));
    }

    Ok(())
}
