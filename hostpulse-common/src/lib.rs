//! hostpulse Common Library
//!
//! This crate provides shared types and utilities for hostpulse metric producers:
//!
//! - [`snapshot`] - Metrics data model (`MetricsSample`, `MetricsSnapshot`, `SnapshotRecord`)
//! - [`serialization`] - JSON record encoding and decoding
//! - [`config`] - Kafka and logging configuration
//! - [`producer`] - Kafka producer construction and broker reachability check
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod producer;
pub mod serialization;
pub mod snapshot;

// Re-export commonly used types at the crate root
pub use config::{KafkaConfig, LogFormat, LoggingConfig};
pub use error::{Error, Result};
pub use producer::{client_config, connect};
pub use serialization::{decode, decode_record, encode, encode_record};
pub use snapshot::{MetricsSample, MetricsSnapshot, SnapshotRecord, current_timestamp_millis};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json())
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
