//! Configuration for the sysinfo producer.

use serde::{Deserialize, Serialize};

use hostpulse_framework::{
    ProducerError, KafkaConfig, LoggingConfig, ProducerConfig, Result, validate_common,
};

/// Complete producer configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SysinfoProducerConfig {
    /// Kafka connection settings.
    #[serde(default)]
    pub kafka: KafkaConfig,

    /// Publishing settings.
    #[serde(default)]
    pub producer: PublishConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where and how snapshots are published.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Topic receiving one record per cycle (default: "system-info-topic").
    #[serde(default = "default_topic")]
    pub topic: String,

    /// What to do when the client's send queue is full.
    #[serde(default)]
    pub queue_full: QueueFullPolicy,

    /// How long the `block` policy keeps retrying before giving up (default: 5000).
    #[serde(default = "default_queue_full_timeout_ms")]
    pub queue_full_timeout_ms: u64,

    /// How long to wait for outstanding deliveries on shutdown (default: 10000).
    #[serde(default = "default_flush_timeout_ms")]
    pub flush_timeout_ms: u64,
}

fn default_topic() -> String {
    "system-info-topic".to_string()
}

fn default_queue_full_timeout_ms() -> u64 {
    5_000
}

fn default_flush_timeout_ms() -> u64 {
    10_000
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            topic: default_topic(),
            queue_full: QueueFullPolicy::default(),
            queue_full_timeout_ms: default_queue_full_timeout_ms(),
            flush_timeout_ms: default_flush_timeout_ms(),
        }
    }
}

/// Behaviour when a snapshot cannot be enqueued because the send queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueFullPolicy {
    /// Serve delivery callbacks and retry until the timeout, then fail.
    #[default]
    Block,
    /// Discard the snapshot and carry on with the next cycle.
    Drop,
    /// Treat a full queue as fatal.
    Fail,
}

impl ProducerConfig for SysinfoProducerConfig {
    fn kafka(&self) -> &KafkaConfig {
        &self.kafka
    }

    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn topic(&self) -> &str {
        &self.producer.topic
    }

    fn flush_timeout_ms(&self) -> u64 {
        self.producer.flush_timeout_ms
    }

    fn validate(&self) -> Result<()> {
        validate_common(self)?;

        if self.producer.queue_full == QueueFullPolicy::Block
            && self.producer.queue_full_timeout_ms == 0
        {
            return Err(ProducerError::validation(
                "queue_full_timeout_ms must be > 0 with the block policy",
            ));
        }

        Ok(())
    }
}
