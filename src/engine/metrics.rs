use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Delivery counters shared by all consumers plus a queue-depth gauge
/// sampled by the reporter.
///
/// Counters only go up; the gauge is a point-in-time snapshot and may be
/// stale by the time anyone reads it. Nothing in here drives control flow,
/// the soft backpressure check reads the queue itself.
#[derive(Clone)]
pub struct SimMetrics {
    succeeded: Arc<AtomicU64>,
    failed: Arc<AtomicU64>,
    queue_depth: Arc<AtomicUsize>,
}

#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub succeeded: u64,
    pub failed: u64,
    pub queue_depth: usize,
}

impl MetricsSnapshot {
    pub fn attempted(&self) -> u64 {
        self.succeeded + self.failed
    }

    /// Final run report, printed once after all workers have joined.
    pub fn print_summary(&self, elapsed: Duration) {
        let total = self.attempted();
        let secs = elapsed.as_secs_f64();
        let tps = if secs > 0.0 { total as f64 / secs } else { 0.0 };

        println!("\n==============================");
        println!("Total orders : {total}");
        println!("Succeeded    : {}", self.succeeded);
        println!("Failed       : {}", self.failed);
        println!("Elapsed      : {secs:.2}s");
        println!("Avg TPS      : {tps:.2}");
        println!("==============================");
    }
}

impl SimMetrics {
    pub fn new() -> Self {
        Self {
            succeeded: Arc::new(AtomicU64::new(0)),
            failed: Arc::new(AtomicU64::new(0)),
            queue_depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_queue_depth(&self, depth: usize) {
        self.queue_depth.store(depth, Ordering::Relaxed);
    }

    pub fn succeeded(&self) -> u64 {
        self.succeeded.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn attempted(&self) -> u64 {
        self.succeeded() + self.failed()
    }

    pub fn queue_depth(&self) -> usize {
        self.queue_depth.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            succeeded: self.succeeded(),
            failed: self.failed(),
            queue_depth: self.queue_depth(),
        }
    }

}

impl Default for SimMetrics {
    fn default() -> Self {
        Self::new()
    }
}
