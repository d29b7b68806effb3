//! Record publishing to Kafka.

use std::sync::Arc;
use std::time::Duration;

use rdkafka::ClientContext;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::Message;
use rdkafka::producer::{BaseProducer, BaseRecord, DeliveryResult, Producer, ProducerContext};

use hostpulse_common::{KafkaConfig, connect};

use crate::delivery::{DeliveryStats, DeliveryTracker};
use crate::error::{ProducerError, Result};

/// A broker client that accepts records for asynchronous delivery to one topic.
///
/// `publish` only enqueues; delivery outcomes are reported later, from
/// inside `poll` or `flush`, on the calling thread.
pub trait Publisher: Send + Sync {
    /// Topic every record goes to.
    fn topic(&self) -> &str;

    /// Enqueue a record value (no key) for delivery.
    ///
    /// Returns [`ProducerError::QueueFull`] when the local send queue has no room.
    fn publish(&self, payload: &[u8]) -> Result<()>;

    /// Serve pending delivery callbacks, blocking up to `timeout`.
    fn poll(&self, timeout: Duration);

    /// Wait for all outstanding deliveries, up to `timeout`.
    fn flush(&self, timeout: Duration) -> Result<()>;

    /// Records enqueued or in transit whose outcome has not been reported.
    fn in_flight(&self) -> usize;

    /// Delivery outcomes reported so far.
    fn stats(&self) -> DeliveryStats;
}

/// rdkafka producer context that forwards delivery reports to a [`DeliveryTracker`].
pub struct DeliveryContext {
    tracker: Arc<DeliveryTracker>,
}

impl DeliveryContext {
    /// Create a context reporting into `tracker`.
    pub fn new(tracker: Arc<DeliveryTracker>) -> Self {
        Self { tracker }
    }
}

impl ClientContext for DeliveryContext {}

impl ProducerContext for DeliveryContext {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _opaque: Self::DeliveryOpaque) {
        match delivery_result {
            Ok(message) => {
                self.tracker
                    .on_delivered(message.topic(), message.partition(), message.offset())
            }
            Err((error, message)) => self.tracker.on_failed(message.topic(), error),
        }
    }
}

/// [`Publisher`] backed by an rdkafka [`BaseProducer`].
pub struct KafkaPublisher {
    producer: BaseProducer<DeliveryContext>,
    topic: String,
    tracker: Arc<DeliveryTracker>,
}

impl KafkaPublisher {
    /// Connect to the cluster and prepare to publish to `topic`.
    ///
    /// Fails if no broker answers within the configured connect timeout.
    pub async fn connect(config: &KafkaConfig, topic: impl Into<String>) -> Result<Self> {
        let topic = topic.into();
        let tracker = Arc::new(DeliveryTracker::new());
        let producer = connect(config, &topic, DeliveryContext::new(tracker.clone())).await?;

        Ok(Self {
            producer,
            topic,
            tracker,
        })
    }
}

impl Publisher for KafkaPublisher {
    fn topic(&self) -> &str {
        &self.topic
    }

    fn publish(&self, payload: &[u8]) -> Result<()> {
        let record = BaseRecord::<(), [u8]>::to(&self.topic).payload(payload);

        self.producer
            .send(record)
            .map_err(|(error, _record)| send_error(&self.topic, error))
    }

    fn poll(&self, timeout: Duration) {
        self.producer.poll(timeout);
    }

    fn flush(&self, timeout: Duration) -> Result<()> {
        self.producer
            .flush(timeout)
            .map_err(|e| ProducerError::Flush(e.to_string()))
    }

    fn in_flight(&self) -> usize {
        usize::try_from(self.producer.in_flight_count()).unwrap_or(0)
    }

    fn stats(&self) -> DeliveryStats {
        self.tracker.stats()
    }
}

/// Classify a send failure.
fn send_error(topic: &str, error: KafkaError) -> ProducerError {
    match error {
        KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull) => ProducerError::QueueFull {
            topic: topic.to_string(),
        },
        other => ProducerError::Publish {
            topic: topic.to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_full_is_distinguished() {
        let err = send_error(
            "system-info-topic",
            KafkaError::MessageProduction(RDKafkaErrorCode::QueueFull),
        );
        assert!(matches!(err, ProducerError::QueueFull { ref topic } if topic == "system-info-topic"));
    }

    #[test]
    fn test_other_send_errors_are_publish_errors() {
        let err = send_error(
            "system-info-topic",
            KafkaError::MessageProduction(RDKafkaErrorCode::MessageSizeTooLarge),
        );
        assert!(matches!(err, ProducerError::Publish { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_connect_unreachable_broker() {
        let config = KafkaConfig {
            bootstrap_servers: "127.0.0.1:9".to_string(),
            connect_timeout_ms: 500,
            ..KafkaConfig::default()
        };

        let result = KafkaPublisher::connect(&config, "system-info-topic").await;
        assert!(matches!(result, Err(ProducerError::KafkaConnection(_))));
    }
}
