//! Rolling-window latency statistics.
//!
//! Confirmation latency is both user feedback and an observation feature for
//! downstream learning, so reads must be cheap and consistent: appends go
//! under a short lock, reads take a snapshot of the window.

use parking_lot::RwLock;
use std::collections::VecDeque;

/// Default rolling window size.
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Point-in-time view of the latency window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySnapshot {
    /// Mean latency over the window.
    pub avg_ms: f64,
    /// Median latency.
    pub p50_ms: u64,
    /// 95th percentile latency.
    pub p95_ms: u64,
    /// Number of samples currently in the window.
    pub sample_count: usize,
}

impl LatencySnapshot {
    /// Snapshot of an empty window.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            avg_ms: 0.0,
            p50_ms: 0,
            p95_ms: 0,
            sample_count: 0,
        }
    }
}

/// Fixed-size rolling window of confirmation latency samples.
#[derive(Debug)]
pub struct LatencyStats {
    window_size: usize,
    samples: RwLock<VecDeque<u64>>,
}

impl LatencyStats {
    /// Create stats with the given window size (minimum 1).
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            samples: RwLock::new(VecDeque::with_capacity(window_size)),
        }
    }

    /// Append a latency sample, evicting the oldest when the window is full.
    pub fn record(&self, latency_ms: u64) {
        let mut samples = self.samples.write();
        if samples.len() == self.window_size {
            samples.pop_front();
        }
        samples.push_back(latency_ms);
    }

    /// Compute average and percentiles over the current window.
    #[must_use]
    pub fn snapshot(&self) -> LatencySnapshot {
        let sorted: Vec<u64> = {
            let samples = self.samples.read();
            let mut v: Vec<u64> = samples.iter().copied().collect();
            v.sort_unstable();
            v
        };

        if sorted.is_empty() {
            return LatencySnapshot::empty();
        }

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        LatencySnapshot {
            avg_ms: sum as f64 / count as f64,
            p50_ms: percentile(&sorted, 50),
            p95_ms: percentile(&sorted, 95),
            sample_count: count,
        }
    }

    /// Number of samples currently held.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.samples.read().len()
    }
}

impl Default for LatencyStats {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

/// Nearest-rank percentile over a sorted slice.
fn percentile(sorted: &[u64], pct: usize) -> u64 {
    debug_assert!(!sorted.is_empty());
    let rank = (pct * sorted.len()).div_ceil(100).max(1);
    sorted[rank - 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let stats = LatencyStats::new(10);
        let snap = stats.snapshot();

        assert_eq!(snap.sample_count, 0);
        assert_eq!(snap.avg_ms, 0.0);
        assert_eq!(snap.p50_ms, 0);
        assert_eq!(snap.p95_ms, 0);
    }

    #[test]
    fn test_average_and_percentiles() {
        let stats = LatencyStats::new(100);
        for ms in [100, 200, 300, 400, 500] {
            stats.record(ms);
        }

        let snap = stats.snapshot();
        assert_eq!(snap.sample_count, 5);
        assert_eq!(snap.avg_ms, 300.0);
        assert_eq!(snap.p50_ms, 300);
        assert_eq!(snap.p95_ms, 500);
    }

    #[test]
    fn test_window_eviction() {
        let stats = LatencyStats::new(3);
        for ms in [10, 20, 30, 40] {
            stats.record(ms);
        }

        // Oldest sample (10) evicted.
        let snap = stats.snapshot();
        assert_eq!(snap.sample_count, 3);
        assert_eq!(snap.avg_ms, 30.0);
    }

    #[test]
    fn test_single_sample() {
        let stats = LatencyStats::new(10);
        stats.record(180);

        let snap = stats.snapshot();
        assert_eq!(snap.sample_count, 1);
        assert_eq!(snap.p50_ms, 180);
        assert_eq!(snap.p95_ms, 180);
        assert_eq!(snap.avg_ms, 180.0);
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let sorted: Vec<u64> = (1..=100).collect();
        assert_eq!(percentile(&sorted, 50), 50);
        assert_eq!(percentile(&sorted, 95), 95);
        assert_eq!(percentile(&sorted, 100), 100);
    }
}
