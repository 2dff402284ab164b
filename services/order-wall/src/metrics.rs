//! Poller counters and rebuild latency
//!
//! Counters are relaxed atomics shared between the poll task and readers;
//! `export` flattens them for logging or a scrape endpoint.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Counters for one ladder poller.
pub struct PollerMetrics {
    pub polls_started: AtomicU64,
    pub snapshots_applied: AtomicU64,
    pub fetch_failures: AtomicU64,
    pub fetch_aborts: AtomicU64,
    pub stale_discarded: AtomicU64,
    /// Failures since the last applied snapshot.
    pub consecutive_failures: AtomicU64,
    pub rebuild_us: Mutex<LatencyTracker>,
}

impl PollerMetrics {
    pub fn new() -> Self {
        Self {
            polls_started: AtomicU64::new(0),
            snapshots_applied: AtomicU64::new(0),
            fetch_failures: AtomicU64::new(0),
            fetch_aborts: AtomicU64::new(0),
            stale_discarded: AtomicU64::new(0),
            consecutive_failures: AtomicU64::new(0),
            rebuild_us: Mutex::new(LatencyTracker::new(256)),
        }
    }

    pub fn record_poll(&self) {
        self.polls_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_applied(&self, rebuild_us: u64) {
        self.snapshots_applied.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        if let Ok(mut tracker) = self.rebuild_us.lock() {
            tracker.record(rebuild_us);
        }
    }

    pub fn record_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_abort(&self) {
        self.fetch_aborts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stale(&self) {
        self.stale_discarded.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether `threshold` or more fetches have failed in a row.
    pub fn is_degraded(&self, threshold: u64) -> bool {
        threshold > 0 && self.consecutive_failures.load(Ordering::Relaxed) >= threshold
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub fn export(&self) -> BTreeMap<&'static str, u64> {
        let mut m = BTreeMap::new();
        m.insert("polls_started", self.polls_started.load(Ordering::Relaxed));
        m.insert("snapshots_applied", self.snapshots_applied.load(Ordering::Relaxed));
        m.insert("fetch_failures", self.fetch_failures.load(Ordering::Relaxed));
        m.insert("fetch_aborts", self.fetch_aborts.load(Ordering::Relaxed));
        m.insert("stale_discarded", self.stale_discarded.load(Ordering::Relaxed));
        m.insert(
            "consecutive_failures",
            self.consecutive_failures.load(Ordering::Relaxed),
        );
        if let Ok(tracker) = self.rebuild_us.lock() {
            m.insert("rebuild_samples", tracker.count() as u64);
            if let Some(p99) = tracker.percentile(99) {
                m.insert("rebuild_p99_us", p99);
            }
        }
        m
    }
}

impl Default for PollerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Rolling window of latency samples.
pub struct LatencyTracker {
    samples: VecDeque<u64>,
    max_samples: usize,
}

impl LatencyTracker {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&mut self, value: u64) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    /// Nearest-rank percentile (0-100).
    pub fn percentile(&self, p: usize) -> Option<u64> {
        if self.samples.is_empty() {
            return None;
        }
        let mut sorted: Vec<u64> = self.samples.iter().copied().collect();
        sorted.sort_unstable();

        let idx = p.min(100) * (sorted.len() - 1) / 100;
        sorted.get(idx).copied()
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }
}
