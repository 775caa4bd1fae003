//! Observability: tracing setup and per-worker counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_names(true)
        .try_init();
}

/// Counters for a single periodic worker
#[derive(Debug, Default)]
pub struct WorkerMetrics {
    starts: AtomicU64,
    ticks: AtomicU64,
    failures: AtomicU64,
    active_units: AtomicU64,
}

impl WorkerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn started(&self) {
        self.starts.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "starts", "Metric incremented");
    }

    pub fn ticked(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "failures", "Metric incremented");
    }

    pub fn unit_spawned(&self) {
        self.active_units.fetch_add(1, Ordering::AcqRel);
    }

    pub fn unit_exited(&self) {
        self.active_units.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            starts: self.starts.load(Ordering::Relaxed),
            ticks: self.ticks.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            active_units: self.active_units.load(Ordering::Acquire),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub starts: u64,
    pub ticks: u64,
    pub failures: u64,
    pub active_units: u64,
}
