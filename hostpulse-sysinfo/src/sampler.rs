//! The sample-and-publish loop.
//!
//! Each cycle takes one snapshot, encodes it, hands it to the publisher for
//! asynchronous delivery, and serves pending delivery callbacks. Cycles are
//! paced by an explicit timer rather than by any blocking in the metrics
//! call.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use hostpulse_common::{current_timestamp_millis, encode_record};
use hostpulse_framework::{ProducerError, MetricsSnapshot, Publisher, Result};

use crate::collector::MetricsProvider;
use crate::config::QueueFullPolicy;

/// Longest single poll while waiting for room in a full send queue.
const QUEUE_FULL_POLL: Duration = Duration::from_millis(100);

/// Loop timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    /// Time between the start of consecutive cycles; also the CPU sampling window.
    pub period: Duration,
    /// Upper bound on the per-cycle wait for delivery callbacks.
    pub poll_timeout: Duration,
}

impl Default for Cadence {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(4),
            poll_timeout: Duration::from_secs(1),
        }
    }
}

/// What happened to the snapshot taken in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Enqueued for delivery.
    Published(MetricsSnapshot),
    /// Discarded because the send queue was full.
    Dropped(MetricsSnapshot),
}

impl CycleOutcome {
    /// The snapshot taken in this cycle.
    pub fn snapshot(&self) -> &MetricsSnapshot {
        match self {
            CycleOutcome::Published(snapshot) | CycleOutcome::Dropped(snapshot) => snapshot,
        }
    }
}

/// Samples host metrics and publishes one record per cycle.
pub struct Sampler<M, P> {
    provider: M,
    publisher: Arc<P>,
    cadence: Cadence,
    queue_full: QueueFullPolicy,
    queue_full_timeout: Duration,
    last_timestamp: i64,
    cycles: u64,
}

impl<M, P> Sampler<M, P>
where
    M: MetricsProvider,
    P: Publisher + 'static,
{
    /// Create a sampler with the default queue-full policy.
    pub fn new(provider: M, publisher: Arc<P>, cadence: Cadence) -> Self {
        Self {
            provider,
            publisher,
            cadence,
            queue_full: QueueFullPolicy::default(),
            queue_full_timeout: Duration::from_secs(5),
            last_timestamp: 0,
            cycles: 0,
        }
    }

    /// Set the policy applied when the send queue is full.
    ///
    /// `timeout` bounds how long [`QueueFullPolicy::Block`] keeps retrying.
    pub fn with_queue_full_policy(mut self, policy: QueueFullPolicy, timeout: Duration) -> Self {
        self.queue_full = policy;
        self.queue_full_timeout = timeout;
        self
    }

    /// Number of completed cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run cycles on the cadence timer until `shutdown` resolves.
    ///
    /// A cycle in progress is finished before stopping. Any cycle error ends
    /// the loop and is returned. Returns the number of completed cycles.
    pub async fn run_until<F>(mut self, shutdown: F) -> Result<u64>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        let mut ticker = tokio::time::interval(self.cadence.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            topic = %self.publisher.topic(),
            period_ms = self.cadence.period.as_millis() as u64,
            policy = ?self.queue_full,
            "Starting sampler"
        );

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = ticker.tick() => {}
            }

            self.cycle().await?;
        }

        info!(cycles = self.cycles, "Sampler stopped");
        Ok(self.cycles)
    }

    /// Run one sample-and-publish cycle.
    pub async fn cycle(&mut self) -> Result<CycleOutcome> {
        let sample = self.provider.sample()?;

        // Keep timestamps non-decreasing across wall-clock adjustments.
        let timestamp = current_timestamp_millis().max(self.last_timestamp);
        self.last_timestamp = timestamp;

        let snapshot = MetricsSnapshot::from_sample(sample, timestamp);
        let payload = encode_record(&snapshot.to_record())?;

        let outcome = self.submit(&payload, snapshot).await?;
        self.poll(self.cadence.poll_timeout).await;
        self.cycles += 1;

        debug!(
            cycle = self.cycles,
            cpu_percent = snapshot.cpu_percent,
            process_count = snapshot.process_count,
            memory_percent = snapshot.memory_percent,
            published = matches!(outcome, CycleOutcome::Published(_)),
            "Cycle complete"
        );

        Ok(outcome)
    }

    /// Enqueue the payload, applying the queue-full policy.
    async fn submit(&self, payload: &[u8], snapshot: MetricsSnapshot) -> Result<CycleOutcome> {
        let deadline = Instant::now() + self.queue_full_timeout;

        loop {
            match self.publisher.publish(payload) {
                Ok(()) => return Ok(CycleOutcome::Published(snapshot)),
                Err(ProducerError::QueueFull { topic }) => match self.queue_full {
                    QueueFullPolicy::Drop => {
                        warn!(topic = %topic, timestamp = snapshot.timestamp, "Send queue full, dropping snapshot");
                        return Ok(CycleOutcome::Dropped(snapshot));
                    }
                    QueueFullPolicy::Fail => return Err(ProducerError::QueueFull { topic }),
                    QueueFullPolicy::Block => {
                        let now = Instant::now();
                        if now >= deadline {
                            return Err(ProducerError::QueueFull { topic });
                        }
                        debug!(topic = %topic, "Send queue full, serving delivery callbacks");
                        self.poll(QUEUE_FULL_POLL.min(deadline - now)).await;
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// Serve delivery callbacks on the blocking pool.
    async fn poll(&self, timeout: Duration) {
        let publisher = self.publisher.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || publisher.poll(timeout)).await {
            warn!(error = %e, "Delivery poll task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cadence() {
        let cadence = Cadence::default();
        assert_eq!(cadence.period, Duration::from_secs(4));
        assert_eq!(cadence.poll_timeout, Duration::from_secs(1));
        assert!(cadence.poll_timeout < cadence.period);
    }

    #[test]
    fn test_outcome_snapshot() {
        let snapshot = MetricsSnapshot {
            cpu_percent: 1.0,
            process_count: 2,
            memory_total: 3,
            memory_available: 1,
            memory_percent: 66.7,
            timestamp: 5,
        };
        assert_eq!(CycleOutcome::Dropped(snapshot).snapshot(), &snapshot);
        assert_eq!(CycleOutcome::Published(snapshot).snapshot().timestamp, 5);
    }
}
