//! Delivery outcome reporting.
//!
//! Delivery results arrive asynchronously from the broker client. They are
//! observational only: a failed delivery is logged and counted, never retried.

use std::sync::atomic::{AtomicU64, Ordering};

/// Tracks delivery outcomes reported by the broker client.
#[derive(Debug, Default)]
pub struct DeliveryTracker {
    /// Messages acknowledged by the broker.
    delivered: AtomicU64,
    /// Messages the client gave up on.
    failed: AtomicU64,
}

/// Point-in-time copy of the delivery counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Number of delivered messages.
    pub delivered: u64,
    /// Number of failed deliveries.
    pub failed: u64,
}

impl DeliveryStats {
    /// Total number of completed deliveries.
    pub fn total(&self) -> u64 {
        self.delivered + self.failed
    }
}

impl DeliveryTracker {
    /// Create a tracker with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful delivery.
    pub fn on_delivered(&self, topic: &str, partition: i32, offset: i64) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        tracing::info!(topic = %topic, partition, offset, "Message delivered");
    }

    /// Record a failed delivery.
    pub fn on_failed(&self, topic: &str, error: &dyn std::fmt::Display) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        tracing::warn!(topic = %topic, error = %error, "Message delivery failed");
    }

    /// Number of delivered messages so far.
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Number of failed deliveries so far.
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Snapshot of both counters.
    pub fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            delivered: self.delivered(),
            failed: self.failed(),
        }
    }
}
