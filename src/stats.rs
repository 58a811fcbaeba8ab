//! Per-resource usage and failure statistics

use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Snapshot of a tracked resource's statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStats {
    error_count: usize,
    use_count: usize,
    last_used: Option<Instant>,
}

impl ResourceStats {
    /// Failures reported since the resource was added
    pub fn errors(&self) -> usize {
        self.error_count
    }

    /// Committed or reserved uses since the resource was added
    pub fn uses(&self) -> usize {
        self.use_count
    }

    /// When the resource was last used, if ever
    pub fn last_used(&self) -> Option<Instant> {
        self.last_used
    }

    /// Time still to wait at `now` before the throttle window has passed.
    ///
    /// Zero when there is no timeout, the resource was never used, or the
    /// window has already elapsed.
    pub fn remaining_wait(&self, timeout: Option<Duration>, now: Instant) -> Duration {
        match (timeout, self.last_used) {
            (Some(timeout), Some(last)) => {
                timeout.saturating_sub(now.saturating_duration_since(last))
            }
            _ => Duration::ZERO,
        }
    }

    pub(crate) fn stamp(&mut self, now: Instant) {
        self.last_used = Some(now);
        self.use_count += 1;
    }

    pub(crate) fn record_failure(&mut self) -> usize {
        self.error_count += 1;
        self.error_count
    }
}

/// Live stats record shared between the store and outstanding leases.
///
/// The id distinguishes records created by separate adds of the same value.
#[derive(Debug)]
pub(crate) struct StatsEntry {
    pub id: u64,
    stats: Mutex<ResourceStats>,
}

impl StatsEntry {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            stats: Mutex::new(ResourceStats::default()),
        }
    }

    pub fn snapshot(&self) -> ResourceStats {
        self.stats.lock().clone()
    }

    pub fn mark_used(&self, now: Instant) {
        self.stats.lock().stamp(now);
    }

    /// Stamp the record and return the wait owed against the previous stamp
    pub fn reserve(&self, timeout: Option<Duration>, now: Instant) -> Duration {
        let mut stats = self.stats.lock();
        let wait = stats.remaining_wait(timeout, now);
        stats.stamp(now);
        wait
    }

    /// Increment the error count under the record's lock, returning the new count
    pub fn record_failure(&self) -> usize {
        self.stats.lock().record_failure()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_wait_without_timeout_or_use() {
        let now = Instant::now();
        let stats = ResourceStats::default();
        assert_eq!(stats.remaining_wait(Some(Duration::from_secs(1)), now), Duration::ZERO);

        let entry = StatsEntry::new(1);
        entry.mark_used(now);
        assert_eq!(entry.snapshot().remaining_wait(None, now), Duration::ZERO);
    }

    #[test]
    fn test_remaining_wait_inside_and_past_window() {
        let start = Instant::now();
        let entry = StatsEntry::new(1);
        entry.mark_used(start);
        let stats = entry.snapshot();
        let timeout = Some(Duration::from_secs(1));

        assert_eq!(stats.remaining_wait(timeout, start), Duration::from_secs(1));
        assert_eq!(
            stats.remaining_wait(timeout, start + Duration::from_millis(400)),
            Duration::from_millis(600)
        );
        assert_eq!(stats.remaining_wait(timeout, start + Duration::from_secs(2)), Duration::ZERO);
    }

    #[test]
    fn test_reserve_returns_wait_from_previous_stamp() {
        let start = Instant::now();
        let entry = StatsEntry::new(1);
        let timeout = Some(Duration::from_secs(1));

        assert_eq!(entry.reserve(timeout, start), Duration::ZERO);
        let wait = entry.reserve(timeout, start + Duration::from_millis(250));
        assert_eq!(wait, Duration::from_millis(750));

        let stats = entry.snapshot();
        assert_eq!(stats.uses(), 2);
        assert_eq!(stats.last_used(), Some(start + Duration::from_millis(250)));
    }

    #[test]
    fn test_record_failure_counts_up() {
        let entry = StatsEntry::new(1);
        assert_eq!(entry.record_failure(), 1);
        assert_eq!(entry.record_failure(), 2);
        assert_eq!(entry.snapshot().errors(), 2);
    }
}
