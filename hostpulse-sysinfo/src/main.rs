//! Host metrics producer.
//!
//! Samples local system metrics and publishes them to Kafka until
//! interrupted, then flushes pending deliveries.

use std::time::Duration;

use anyhow::{Context, Result};
use hostpulse_framework::{ProducerArgs, ProducerConfig, ProducerRunner};

use hostpulse_sysinfo::collector::SystemCollector;
use hostpulse_sysinfo::config::SysinfoProducerConfig;
use hostpulse_sysinfo::sampler::{Cadence, Sampler};

const DEFAULT_CONFIG: &str = "sysinfo-producer.json5";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = ProducerArgs::parse();

    // Load configuration, falling back to built-in defaults
    let config = match args.config_path(DEFAULT_CONFIG) {
        Some(path) => SysinfoProducerConfig::load(&path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => SysinfoProducerConfig::default(),
    };
    let publish = config.producer.clone();

    // Connect to Kafka; an unreachable broker ends the process here
    let runner = ProducerRunner::new_with_args("sysinfo", config, Some(&args))
        .await
        .context("Failed to start producer")?;

    let cadence = Cadence::default();
    tracing::info!(
        topic = %publish.topic,
        period_s = cadence.period.as_secs(),
        queue_full = ?publish.queue_full,
        "Sysinfo producer configured"
    );

    let collector = SystemCollector::new().await;

    // Run until Ctrl+C / SIGTERM, then flush
    runner
        .run(move |publisher, mut shutdown| async move {
            Sampler::new(collector, publisher, cadence)
                .with_queue_full_policy(
                    publish.queue_full,
                    Duration::from_millis(publish.queue_full_timeout_ms),
                )
                .run_until(shutdown.wait())
                .await
                .map(|_| ())
        })
        .await
        .context("Sysinfo producer failed")
}
