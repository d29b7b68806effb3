//! Producer runner for lifecycle management.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hostpulse_common::{LoggingConfig, init_tracing};

use crate::ProducerArgs;
use crate::config::ProducerConfig;
use crate::delivery::DeliveryStats;
use crate::error::{ProducerError, Result};
use crate::publisher::{KafkaPublisher, Publisher};
use crate::shutdown::{self, Shutdown, termination_signal};

/// Producer runner that manages the lifecycle of a metrics producer.
///
/// Handles:
/// - Logging initialization
/// - Kafka connection (fatal if no broker answers)
/// - Running the worker with an owned publisher handle
/// - Shutdown on Ctrl+C / SIGTERM
/// - Flushing outstanding deliveries before exit
///
/// # Example
///
/// ```ignore
/// use hostpulse_framework::{ProducerArgs, ProducerConfig, ProducerRunner};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let args = ProducerArgs::parse();
///     let config = MyProducerConfig::load("producer.json5")?;
///
///     let runner = ProducerRunner::new_with_args("myproducer", config, Some(&args)).await?;
///
///     runner
///         .run(|publisher, shutdown| async move {
///             // Worker logic here; return when `shutdown` fires
///             Ok(())
///         })
///         .await?;
///     Ok(())
/// }
/// ```
pub struct ProducerRunner<C: ProducerConfig, P: Publisher = KafkaPublisher> {
    /// Producer name for logging.
    name: String,
    /// The loaded configuration.
    config: C,
    /// Publisher, owned here and lent to the worker.
    publisher: Arc<P>,
}

impl<C: ProducerConfig> ProducerRunner<C, KafkaPublisher> {
    /// Create a producer runner connected to Kafka.
    ///
    /// This will:
    /// 1. Initialize logging based on config (`--log-level` overrides the level)
    /// 2. Connect to Kafka, failing if no broker answers in time
    /// 3. Create the publisher
    pub async fn new_with_args(
        name: impl Into<String>,
        config: C,
        args: Option<&ProducerArgs>,
    ) -> Result<Self> {
        let name = name.into();

        init_tracing(&log_config(&config, args))
            .map_err(|e| ProducerError::config(e.to_string()))?;

        tracing::info!(producer = %name, version = env!("CARGO_PKG_VERSION"), "Starting producer");

        let publisher = Arc::new(KafkaPublisher::connect(config.kafka(), config.topic()).await?);

        Ok(Self::with_publisher(name, config, publisher))
    }
}

impl<C: ProducerConfig, P: Publisher + 'static> ProducerRunner<C, P> {
    /// Create a runner around an already connected publisher.
    pub fn with_publisher(name: impl Into<String>, config: C, publisher: Arc<P>) -> Self {
        Self {
            name: name.into(),
            config,
            publisher,
        }
    }

    /// Run the worker until it finishes or a termination signal arrives.
    ///
    /// Returns the worker's result, so a fatal worker error ends the process
    /// with a non-zero exit code.
    pub async fn run<F, Fut>(self, worker: F) -> Result<()>
    where
        F: FnOnce(Arc<P>, Shutdown) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.run_with_signal(worker, termination_signal()).await
    }

    /// Run the worker until it finishes or `signal` resolves.
    ///
    /// This will:
    /// 1. Spawn the worker with the publisher and a [`Shutdown`] handle
    /// 2. Wait for `signal`, or for the worker to stop on its own
    /// 3. On a signal, request shutdown and wait for the worker to return
    /// 4. Flush outstanding deliveries, bounded by the flush timeout
    ///
    /// If `signal` fails, shutdown is requested anyway and the listener error
    /// is returned unless the worker already failed.
    pub async fn run_with_signal<F, Fut, S>(self, worker: F, signal: S) -> Result<()>
    where
        F: FnOnce(Arc<P>, Shutdown) -> Fut,
        Fut: Future<Output = Result<()>> + Send + 'static,
        S: Future<Output = std::io::Result<&'static str>>,
    {
        let (trigger, shutdown) = shutdown::channel();
        let mut worker = tokio::spawn(worker(self.publisher.clone(), shutdown));

        tracing::info!(
            producer = %self.name,
            topic = %self.publisher.topic(),
            "Producer running. Press Ctrl+C to stop."
        );

        let mut signal_error = None;
        let joined = tokio::select! {
            joined = &mut worker => joined,
            signal = signal => {
                match signal {
                    Ok(name) => {
                        tracing::info!(producer = %self.name, signal = name, "Received shutdown signal");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to listen for termination signals, stopping");
                        signal_error = Some(e);
                    }
                }
                trigger.trigger();
                (&mut worker).await
            }
        };

        let mut result = joined.unwrap_or_else(|e| Err(ProducerError::worker(e.to_string())));
        if let Err(ref e) = result {
            tracing::error!(producer = %self.name, error = %e, "Worker failed");
        }
        if let Some(e) = signal_error.filter(|_| result.is_ok()) {
            result = Err(ProducerError::Io(e));
        }

        let stats = self.flush().await;
        tracing::info!(
            producer = %self.name,
            delivered = stats.delivered,
            failed = stats.failed,
            completed = stats.total(),
            "Goodbye!"
        );

        result
    }

    /// Flush outstanding deliveries and return the final delivery counters.
    async fn flush(&self) -> DeliveryStats {
        let timeout_ms = self.config.flush_timeout_ms();
        let publisher = self.publisher.clone();

        tracing::info!(pending = publisher.in_flight(), timeout_ms, "Flushing pending deliveries");

        let flush =
            tokio::task::spawn_blocking(move || publisher.flush(Duration::from_millis(timeout_ms)));
        match flush.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, remaining = self.publisher.in_flight(), "Flush incomplete");
            }
            Err(e) => tracing::warn!(error = %e, "Flush task failed"),
        }

        self.publisher.stats()
    }
}

/// Logging settings from the config, with the CLI level taking precedence.
fn log_config<C: ProducerConfig>(config: &C, args: Option<&ProducerArgs>) -> LoggingConfig {
    match args.and_then(|a| a.log_level.as_ref()) {
        Some(level) => LoggingConfig {
            level: level.clone(),
            format: config.logging().format,
        },
        None => config.logging().clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use serde::Deserialize;

    use crate::delivery::DeliveryTracker;
    use crate::{KafkaConfig, LogFormat};

    #[derive(Debug, Default, Deserialize)]
    struct TestConfig {
        #[serde(default)]
        kafka: KafkaConfig,
        #[serde(default)]
        logging: LoggingConfig,
    }

    impl ProducerConfig for TestConfig {
        fn kafka(&self) -> &KafkaConfig {
            &self.kafka
        }

        fn logging(&self) -> &LoggingConfig {
            &self.logging
        }

        fn topic(&self) -> &str {
            "system-info-topic"
        }

        fn flush_timeout_ms(&self) -> u64 {
            100
        }
    }

    /// Publisher that counts flushes and reports one delivery per successful flush.
    #[derive(Default)]
    struct RecordingPublisher {
        tracker: DeliveryTracker,
        flushes: AtomicUsize,
        flush_fails: AtomicBool,
    }

    impl RecordingPublisher {
        fn failing_flush() -> Arc<Self> {
            let publisher = Self::default();
            publisher.flush_fails.store(true, Ordering::SeqCst);
            Arc::new(publisher)
        }

        fn flushes(&self) -> usize {
            self.flushes.load(Ordering::SeqCst)
        }
    }

    impl Publisher for RecordingPublisher {
        fn topic(&self) -> &str {
            "system-info-topic"
        }

        fn publish(&self, _payload: &[u8]) -> Result<()> {
            Ok(())
        }

        fn poll(&self, _timeout: Duration) {}

        fn flush(&self, _timeout: Duration) -> Result<()> {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            if self.flush_fails.load(Ordering::SeqCst) {
                return Err(ProducerError::Flush("Operation timed out".to_string()));
            }
            self.tracker.on_delivered("system-info-topic", 0, 0);
            Ok(())
        }

        fn in_flight(&self) -> usize {
            0
        }

        fn stats(&self) -> DeliveryStats {
            self.tracker.stats()
        }
    }

    fn runner(
        publisher: &Arc<RecordingPublisher>,
    ) -> ProducerRunner<TestConfig, RecordingPublisher> {
        ProducerRunner::with_publisher("test", TestConfig::default(), publisher.clone())
    }

    fn no_signal() -> std::future::Pending<std::io::Result<&'static str>> {
        std::future::pending()
    }

    async fn crashing_worker(_publisher: Arc<RecordingPublisher>, _shutdown: Shutdown) -> Result<()> {
        panic!("sampler crashed");
    }

    #[tokio::test]
    async fn test_worker_error_is_returned_after_flush() {
        let publisher = Arc::new(RecordingPublisher::default());

        let result = runner(&publisher)
            .run_with_signal(
                |_, _| async { Err::<(), _>(ProducerError::metrics("total memory reported as 0 bytes")) },
                no_signal(),
            )
            .await;

        assert!(matches!(result, Err(ProducerError::Metrics(_))));
        assert_eq!(publisher.flushes(), 1);
    }

    #[tokio::test]
    async fn test_worker_panic_maps_to_worker_error() {
        let publisher = Arc::new(RecordingPublisher::default());

        let result = runner(&publisher)
            .run_with_signal(crashing_worker, no_signal())
            .await;

        assert!(matches!(result, Err(ProducerError::Worker(_))));
        assert_eq!(publisher.flushes(), 1);
    }

    #[tokio::test]
    async fn test_flush_error_does_not_change_result() {
        let publisher = RecordingPublisher::failing_flush();

        let result = runner(&publisher)
            .run_with_signal(|_, _| async { Ok::<(), ProducerError>(()) }, no_signal())
            .await;

        assert!(result.is_ok());
        assert_eq!(publisher.flushes(), 1);
        assert_eq!(publisher.stats().delivered, 0);
    }

    #[tokio::test]
    async fn test_signal_stops_worker_then_flushes() {
        let publisher = Arc::new(RecordingPublisher::default());
        let stopped = Arc::new(AtomicBool::new(false));
        let worker_stopped = stopped.clone();

        let signal = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, std::io::Error>("SIGTERM")
        };
        let result = runner(&publisher)
            .run_with_signal(
                move |publisher, mut shutdown| async move {
                    assert_eq!(publisher.topic(), "system-info-topic");
                    shutdown.wait().await;
                    worker_stopped.store(true, Ordering::SeqCst);
                    Ok::<(), ProducerError>(())
                },
                signal,
            )
            .await;

        assert!(result.is_ok());
        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(publisher.flushes(), 1);
        assert_eq!(publisher.stats().delivered, 1);
    }

    #[tokio::test]
    async fn test_signal_listener_failure_stops_worker() {
        let publisher = Arc::new(RecordingPublisher::default());

        let signal = async { Err::<&'static str, _>(std::io::Error::other("signal handler unavailable")) };
        let result = tokio::time::timeout(
            Duration::from_secs(2),
            runner(&publisher).run_with_signal(
                |_, mut shutdown| async move {
                    shutdown.wait().await;
                    Ok::<(), ProducerError>(())
                },
                signal,
            ),
        )
        .await
        .expect("runner should not hang when the signal listener fails");

        assert!(matches!(result, Err(ProducerError::Io(_))));
        assert_eq!(publisher.flushes(), 1);
    }

    #[test]
    fn test_cli_log_level_overrides_config() {
        let config = TestConfig {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: LogFormat::Json,
            },
            ..TestConfig::default()
        };

        let args = ProducerArgs {
            config: None,
            log_level: Some("debug".to_string()),
        };
        let overridden = log_config(&config, Some(&args));
        assert_eq!(overridden.level, "debug");
        assert_eq!(overridden.format, LogFormat::Json);

        let unchanged = log_config(&config, None);
        assert_eq!(unchanged.level, "info");
    }
}
