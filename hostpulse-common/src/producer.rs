use std::time::Duration;

use rdkafka::ClientConfig;
use rdkafka::producer::{BaseProducer, Producer, ProducerContext};

use crate::config::KafkaConfig;
use crate::error::{Error, Result};

/// Build the librdkafka client configuration for a producer.
pub fn client_config(config: &KafkaConfig) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    client_config
        .set("bootstrap.servers", &config.bootstrap_servers)
        .set("client.id", &config.client_id)
        .set("message.timeout.ms", config.message_timeout_ms.to_string())
        .set(
            "queue.buffering.max.messages",
            config.queue_buffering_max_messages.to_string(),
        );
    client_config
}

/// Create a producer and verify the brokers are reachable.
///
/// Fetches metadata for `topic` within `connect_timeout_ms`. An unreachable
/// cluster is an error; a topic the cluster does not know yet only logs a
/// warning, since brokers may create it on first write.
pub async fn connect<C>(config: &KafkaConfig, topic: &str, context: C) -> Result<BaseProducer<C>>
where
    C: ProducerContext + 'static,
{
    tracing::info!(
        bootstrap_servers = %config.bootstrap_servers,
        client_id = %config.client_id,
        topic = %topic,
        "Connecting to Kafka"
    );

    let producer: BaseProducer<C> = client_config(config).create_with_context(context)?;

    let timeout = Duration::from_millis(config.connect_timeout_ms);
    let probe_topic = topic.to_string();
    let (producer, probe) = tokio::task::spawn_blocking(move || {
        let probe = producer
            .client()
            .fetch_metadata(Some(probe_topic.as_str()), timeout)
            .map(|metadata| {
                let brokers = metadata.brokers().len();
                let topic = metadata
                    .topics()
                    .iter()
                    .find(|t| t.name() == probe_topic)
                    .map(|t| (t.partitions().len(), t.error().is_some()));
                (brokers, topic)
            });
        (producer, probe)
    })
    .await
    .map_err(|e| Error::Connect(format!("metadata probe task failed: {}", e)))?;

    let (brokers, topic_info) = probe?;
    if brokers == 0 {
        return Err(Error::Connect(format!(
            "no brokers reachable at '{}'",
            config.bootstrap_servers
        )));
    }

    match topic_info {
        Some((partitions, false)) => {
            tracing::info!(brokers, topic = %topic, partitions, "Connected to Kafka");
        }
        _ => {
            tracing::warn!(
                brokers,
                topic = %topic,
                "Topic not found in cluster metadata; relying on broker auto-creation"
            );
        }
    }

    Ok(producer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_properties() {
        let config = KafkaConfig {
            bootstrap_servers: "localhost:19092".to_string(),
            client_id: "hostpulse-test".to_string(),
            message_timeout_ms: 1500,
            queue_buffering_max_messages: 64,
            connect_timeout_ms: 100,
        };

        let client_config = client_config(&config);

        assert_eq!(client_config.get("bootstrap.servers"), Some("localhost:19092"));
        assert_eq!(client_config.get("client.id"), Some("hostpulse-test"));
        assert_eq!(client_config.get("message.timeout.ms"), Some("1500"));
        assert_eq!(client_config.get("queue.buffering.max.messages"), Some("64"));
    }
}
