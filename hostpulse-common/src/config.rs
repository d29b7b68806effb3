use serde::{Deserialize, Serialize};

/// Kafka connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KafkaConfig {
    /// Comma-separated list of `host:port` bootstrap brokers.
    #[serde(default = "default_bootstrap_servers")]
    pub bootstrap_servers: String,

    /// Client identifier reported to the brokers.
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// How long librdkafka keeps trying to deliver a message before
    /// reporting a delivery failure.
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,

    /// Capacity of the client's local send queue, in messages.
    #[serde(default = "default_queue_buffering_max_messages")]
    pub queue_buffering_max_messages: u32,

    /// How long to wait for broker metadata at startup.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_bootstrap_servers() -> String {
    "kafka:9092".to_string()
}

fn default_client_id() -> String {
    "system-info-producer".to_string()
}

fn default_message_timeout_ms() -> u64 {
    30_000
}

fn default_queue_buffering_max_messages() -> u32 {
    100_000
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: default_bootstrap_servers(),
            client_id: default_client_id(),
            message_timeout_ms: default_message_timeout_ms(),
            queue_buffering_max_messages: default_queue_buffering_max_messages(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}
