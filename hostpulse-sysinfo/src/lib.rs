//! Host metrics producer.
//!
//! Samples local system metrics (CPU utilization, process count, memory)
//! using the `sysinfo` crate and publishes one record per cycle to a Kafka
//! topic.
//!
//! # Record
//!
//! ```text
//! {"cpu_percent":"12.5","process_count":"200","memory_total":"16000000000",
//!  "memory_available":"8000000000","memory_percent":"50.0","timestamp":"1700000000000"}
//! ```
//!
//! Every value is a string; consumers parse the numbers themselves.

pub mod collector;
pub mod config;
pub mod sampler;
