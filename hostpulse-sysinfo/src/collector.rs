//! System metrics collection using sysinfo.

use sysinfo::{MINIMUM_CPU_UPDATE_INTERVAL, ProcessRefreshKind, ProcessesToUpdate, System};

use hostpulse_framework::{ProducerError, MetricsSample, Result};

/// Source of host metric samples.
pub trait MetricsProvider: Send {
    /// Take one sample. CPU usage covers the time since the previous call.
    fn sample(&mut self) -> Result<MetricsSample>;
}

/// Collector for local system metrics.
pub struct SystemCollector {
    system: System,
}

impl SystemCollector {
    /// Create a collector with CPU usage already primed.
    ///
    /// sysinfo computes CPU usage as a delta between two refreshes, so the
    /// first refresh is followed by the minimum update interval.
    pub async fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_usage();
        tokio::time::sleep(MINIMUM_CPU_UPDATE_INTERVAL).await;
        system.refresh_cpu_usage();

        Self { system }
    }
}

impl MetricsProvider for SystemCollector {
    fn sample(&mut self) -> Result<MetricsSample> {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();
        // Only the process list is needed, not per-process details.
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        let total = self.system.total_memory();
        if total == 0 {
            return Err(ProducerError::metrics("total memory reported as 0 bytes"));
        }
        let available = self.system.available_memory().min(total);

        let process_count = self
            .system
            .processes()
            .values()
            .filter(|p| p.thread_kind().is_none())
            .count() as u64;

        Ok(MetricsSample {
            cpu_percent: self.system.global_cpu_usage() as f64,
            process_count,
            memory_total: total,
            memory_available: available,
            memory_percent: memory_percent(total, available),
        })
    }
}

/// Percentage of memory in use, given total and available bytes.
pub fn memory_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let used = total.saturating_sub(available);
    (used as f64 / total as f64) * 100.0
}
