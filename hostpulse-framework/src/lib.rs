//! hostpulse Producer Framework
//!
//! Common abstractions for building producers that publish host metrics to Kafka.
//!
//! # Overview
//!
//! This framework provides:
//! - [`ProducerConfig`] trait for configuration loading and validation
//! - [`ProducerRunner`] for managing producer lifecycle (startup, shutdown, flush)
//! - [`Publisher`] trait and its Kafka implementation [`KafkaPublisher`]
//! - [`DeliveryTracker`] for observing asynchronous delivery outcomes
//! - [`ProducerArgs`] for common CLI argument parsing
//!
//! # Example
//!
//! ```ignore
//! use hostpulse_framework::{ProducerArgs, ProducerConfig, ProducerRunner};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = ProducerArgs::parse();
//!     let config = MyProducerConfig::load("myproducer.json5")?;
//!
//!     let runner = ProducerRunner::new_with_args("myproducer", config, Some(&args)).await?;
//!
//!     // Run the worker until Ctrl+C, then flush
//!     runner.run(|publisher, shutdown| my_worker(publisher, shutdown)).await?;
//!     Ok(())
//! }
//! ```

mod args;
mod config;
mod delivery;
mod error;
mod publisher;
mod runner;
pub mod shutdown;

pub use args::ProducerArgs;
pub use config::{ProducerConfig, validate_common};
pub use delivery::{DeliveryStats, DeliveryTracker};
pub use error::{ProducerError, Result};
pub use publisher::{DeliveryContext, KafkaPublisher, Publisher};
pub use runner::ProducerRunner;
pub use shutdown::Shutdown;

// Re-export commonly used types from hostpulse-common
pub use hostpulse_common::{
    KafkaConfig, LogFormat, LoggingConfig, MetricsSample, MetricsSnapshot, SnapshotRecord,
};
