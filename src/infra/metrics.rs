//! Lock-free metrics collection and periodic reporting
//!
//! Uses atomics for hot-path operations to avoid mutex contention.
//!
//! NOTE: All atomics use Relaxed ordering intentionally—these are statistical
//! counters only. Do NOT use these atomics for coordination or logic decisions.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::info;

/// Update an atomic max value using compare-and-swap loop
#[inline]
fn update_atomic_max(atomic_max: &AtomicU64, new_value: u64) {
    let mut current_max = atomic_max.load(Ordering::Relaxed);
    while new_value > current_max {
        match atomic_max.compare_exchange_weak(
            current_max,
            new_value,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break,
            Err(actual) => current_max = actual,
        }
    }
}

/// Lock-free metrics collector
///
/// All recording operations are lock-free using atomics. The `report()`
/// method swaps the since-report counters to get a consistent snapshot.
pub struct Metrics {
    /// Total events ever processed (monotonic)
    events_total: AtomicU64,
    /// Events since last report (reset on report)
    events_since_report: AtomicU64,
    /// Sum of handler latencies in microseconds (reset on report)
    latency_sum_us: AtomicU64,
    /// Max handler latency in microseconds (reset on report)
    latency_max_us: AtomicU64,
    /// Decodes delivered by scanner connections (monotonic)
    scans_received: AtomicU64,
    /// Decodes dropped because the event channel was full (monotonic)
    scans_dropped: AtomicU64,
    /// Rows appended to the session log (monotonic)
    rows_appended: AtomicU64,
    /// Rows rejected by validation (monotonic)
    rows_rejected: AtomicU64,
    /// CSV files written (monotonic)
    exports_written: AtomicU64,
    /// Failed export attempts (monotonic)
    exports_failed: AtomicU64,
    /// Exports handed to the share target (monotonic)
    shares_sent: AtomicU64,
    /// Failed share attempts (monotonic)
    shares_failed: AtomicU64,
    /// Start of the current report window
    last_report: Mutex<Instant>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            events_total: AtomicU64::new(0),
            events_since_report: AtomicU64::new(0),
            latency_sum_us: AtomicU64::new(0),
            latency_max_us: AtomicU64::new(0),
            scans_received: AtomicU64::new(0),
            scans_dropped: AtomicU64::new(0),
            rows_appended: AtomicU64::new(0),
            rows_rejected: AtomicU64::new(0),
            exports_written: AtomicU64::new(0),
            exports_failed: AtomicU64::new(0),
            shares_sent: AtomicU64::new(0),
            shares_failed: AtomicU64::new(0),
            last_report: Mutex::new(Instant::now()),
        }
    }

    pub fn record_event_processed(&self, latency_us: u64) {
        self.events_total.fetch_add(1, Ordering::Relaxed);
        self.events_since_report.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(latency_us, Ordering::Relaxed);
        update_atomic_max(&self.latency_max_us, latency_us);
    }

    pub fn record_scan_received(&self) {
        self.scans_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scan_dropped(&self) {
        self.scans_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_row_appended(&self) {
        self.rows_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_row_rejected(&self) {
        self.rows_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_export_written(&self) {
        self.exports_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_export_failed(&self) {
        self.exports_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_share_sent(&self) {
        self.shares_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_share_failed(&self) {
        self.shares_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Produce a snapshot, resetting the per-window counters
    pub fn report(&self, rows_in_session: usize) -> MetricsSummary {
        let elapsed = {
            let mut last = self.last_report.lock();
            let elapsed = last.elapsed();
            *last = Instant::now();
            elapsed
        };

        let window_events = self.events_since_report.swap(0, Ordering::Relaxed);
        let latency_sum = self.latency_sum_us.swap(0, Ordering::Relaxed);
        let latency_max = self.latency_max_us.swap(0, Ordering::Relaxed);

        let events_per_sec = if elapsed.as_secs_f64() > 0.0 {
            window_events as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };
        let avg_latency_us = if window_events > 0 { latency_sum / window_events } else { 0 };

        MetricsSummary {
            events_total: self.events_total.load(Ordering::Relaxed),
            events_per_sec,
            avg_latency_us,
            max_latency_us: latency_max,
            rows_in_session,
            scans_received: self.scans_received.load(Ordering::Relaxed),
            scans_dropped: self.scans_dropped.load(Ordering::Relaxed),
            rows_appended: self.rows_appended.load(Ordering::Relaxed),
            rows_rejected: self.rows_rejected.load(Ordering::Relaxed),
            exports_written: self.exports_written.load(Ordering::Relaxed),
            exports_failed: self.exports_failed.load(Ordering::Relaxed),
            shares_sent: self.shares_sent.load(Ordering::Relaxed),
            shares_failed: self.shares_failed.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time counter snapshot
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub events_total: u64,
    pub events_per_sec: f64,
    pub avg_latency_us: u64,
    pub max_latency_us: u64,
    pub rows_in_session: usize,
    pub scans_received: u64,
    pub scans_dropped: u64,
    pub rows_appended: u64,
    pub rows_rejected: u64,
    pub exports_written: u64,
    pub exports_failed: u64,
    pub shares_sent: u64,
    pub shares_failed: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            events_total = %self.events_total,
            events_per_sec = %format!("{:.1}", self.events_per_sec),
            avg_latency_us = %self.avg_latency_us,
            max_latency_us = %self.max_latency_us,
            rows_in_session = %self.rows_in_session,
            scans_received = %self.scans_received,
            scans_dropped = %self.scans_dropped,
            rows_appended = %self.rows_appended,
            rows_rejected = %self.rows_rejected,
            exports_written = %self.exports_written,
            exports_failed = %self.exports_failed,
            shares_sent = %self.shares_sent,
            shares_failed = %self.shares_failed,
            "metrics_summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.record_scan_received();
        metrics.record_scan_received();
        metrics.record_scan_dropped();
        metrics.record_row_appended();
        metrics.record_export_written();
        metrics.record_share_failed();

        let summary = metrics.report(1);
        assert_eq!(summary.scans_received, 2);
        assert_eq!(summary.scans_dropped, 1);
        assert_eq!(summary.rows_appended, 1);
        assert_eq!(summary.exports_written, 1);
        assert_eq!(summary.shares_failed, 1);
        assert_eq!(summary.rows_in_session, 1);
    }

    #[test]
    fn test_report_resets_window_counters() {
        let metrics = Metrics::new();
        metrics.record_event_processed(100);
        metrics.record_event_processed(300);

        let first = metrics.report(0);
        assert_eq!(first.events_total, 2);
        assert_eq!(first.avg_latency_us, 200);
        assert_eq!(first.max_latency_us, 300);

        let second = metrics.report(0);
        assert_eq!(second.events_total, 2, "total is monotonic");
        assert_eq!(second.avg_latency_us, 0, "window resets");
        assert_eq!(second.max_latency_us, 0);
    }

    #[test]
    fn test_atomic_max_keeps_largest() {
        let max = AtomicU64::new(0);
        update_atomic_max(&max, 10);
        update_atomic_max(&max, 5);
        update_atomic_max(&max, 20);
        assert_eq!(max.load(Ordering::Relaxed), 20);
    }
}
