//! Round-robin balancer over a ring of resources

use crate::config::BalancerConfiguration;
use crate::errors::{BalancerError, BalancerResult};
use crate::eviction::EvictionPolicy;
use crate::health::HealthStatus;
use crate::metrics::{BalancerMetrics, MetricsExporter, MetricsTracker};
use crate::ring::Ring;
use crate::stats::{ResourceStats, StatsEntry};
use crate::store::ConcurrentStore;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Bounds every resource identifier must satisfy
pub trait Resource: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> Resource for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

struct Shared<T: Resource> {
    ring: RwLock<Ring<T>>,
    store: ConcurrentStore<T, Arc<StatsEntry>>,
    config: BalancerConfiguration,
    policy: EvictionPolicy,
    metrics: MetricsTracker,
    next_id: AtomicU64,
}

impl<T: Resource> Shared<T> {
    /// Remove `value` only if `entry` is still its live stats record
    fn evict(&self, value: &T, entry: &Arc<StatsEntry>) -> bool {
        let mut ring = self.ring.write();
        match self.store.get(value) {
            Some(current) if Arc::ptr_eq(&current, entry) => {
                ring.remove(value);
                self.store.delete(value);
                MetricsTracker::increment(&self.metrics.evictions);
                debug!(
                    resource = ?value,
                    remaining = ring.len(),
                    "evicted resource after repeated failures"
                );
                true
            }
            _ => false,
        }
    }
}

/// Thread-safe round-robin balancer
///
/// Cloning is cheap and every clone drives the same rotation.
///
/// # Examples
///
/// ```
/// use esox_balancer::{Balancer, BalancerConfiguration};
///
/// let balancer = Balancer::new(BalancerConfiguration::new().with_max_errors(1));
/// balancer.add(["a", "b", "c"]);
///
/// let lease = balancer.acquire().unwrap();
/// assert_eq!(*lease.data(), "a");
/// lease.mark_used();
///
/// // Selection already rotated, regardless of what the lease reports
/// assert_eq!(balancer.peek(), Some("b"));
/// ```
pub struct Balancer<T: Resource> {
    inner: Arc<Shared<T>>,
}

impl<T: Resource> Clone for Balancer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Resource> Default for Balancer<T> {
    fn default() -> Self {
        Self::new(BalancerConfiguration::default())
    }
}

impl<T: Resource> fmt::Debug for Balancer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Balancer")
            .field("vals", &self.vals())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl<T: Resource> Balancer<T> {
    /// Create an empty balancer
    pub fn new(config: BalancerConfiguration) -> Self {
        Self::with_ring(Ring::new(), config)
    }

    /// Create a balancer already holding `values`
    pub fn with_resources<I>(values: I, config: BalancerConfiguration) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        let balancer = Self::with_ring(Ring::with_capacity(values.len()), config);
        balancer.add(values);
        balancer
    }

    fn with_ring(ring: Ring<T>, config: BalancerConfiguration) -> Self {
        let policy = config.eviction_policy();
        Self {
            inner: Arc::new(Shared {
                ring: RwLock::new(ring),
                store: ConcurrentStore::new(),
                config,
                policy,
                metrics: MetricsTracker::new(),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &BalancerConfiguration {
        &self.inner.config
    }

    /// Add resources ahead of the current head, keeping the given order.
    ///
    /// Every value gets a fresh stats record. Adding a value that is already
    /// tracked replaces its record and puts a second node in the ring.
    pub fn add<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let values: Vec<T> = values.into_iter().collect();
        let mut ring = self.inner.ring.write();

        for value in values.into_iter().rev() {
            let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            ring.add_first(value.clone());
            if self.inner.store.set(value.clone(), Arc::new(StatsEntry::new(id))).is_some() {
                warn!(
                    resource = ?value,
                    "resource added twice; the ring now holds a duplicate node"
                );
            }
            debug!(resource = ?value, "added resource");
        }
    }

    /// Remove resources and their stats. Unknown values are ignored.
    pub fn remove<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut ring = self.inner.ring.write();

        for value in values {
            let in_ring = ring.remove(&value);
            let in_store = self.inner.store.delete(&value).is_some();
            if in_ring || in_store {
                debug!(resource = ?value, "removed resource");
            }
        }
    }

    /// Remove every resource
    pub fn clear(&self) {
        let mut ring = self.inner.ring.write();
        ring.clear();
        self.inner.store.clear();
    }

    /// Resource at the head, without rotating
    pub fn peek(&self) -> Option<T> {
        self.inner.ring.read().first().cloned()
    }

    /// Select the head resource and rotate past it.
    ///
    /// Rotation happens whether or not the lease is ever committed.
    pub fn acquire(&self) -> BalancerResult<Lease<T>> {
        let (value, entry) = {
            let mut ring = self.inner.ring.write();
            let (value, entry) = self.select(&ring)?;
            ring.rotate();
            (value, entry)
        };

        MetricsTracker::increment(&self.inner.metrics.total_acquired);
        Ok(Lease {
            value,
            entry,
            shared: Arc::clone(&self.inner),
        })
    }

    /// Select without error details
    pub fn try_acquire(&self) -> Option<Lease<T>> {
        self.acquire().ok()
    }

    /// Select, rotate and reserve the head resource in one step.
    ///
    /// The resource is stamped as used right away and the returned duration
    /// is what is left of the throttle window measured from its previous use.
    /// Nothing here sleeps; honoring the wait is up to the caller.
    pub fn acquire_with_timeout(&self) -> BalancerResult<(T, Duration)> {
        let (value, wait) = {
            let mut ring = self.inner.ring.write();
            let (value, entry) = self.select(&ring)?;
            let wait = entry.reserve(self.inner.config.use_timeout, Instant::now());
            ring.rotate();
            (value, wait)
        };

        MetricsTracker::increment(&self.inner.metrics.total_acquired);
        MetricsTracker::increment(&self.inner.metrics.throttled_acquired);
        if !wait.is_zero() {
            debug!(
                resource = ?value,
                wait = ?wait,
                "resource still inside its throttle window"
            );
        }
        Ok((value, wait))
    }

    pub fn try_acquire_with_timeout(&self) -> Option<(T, Duration)> {
        self.acquire_with_timeout().ok()
    }

    /// Stats snapshot for a tracked resource
    pub fn stats(&self, value: &T) -> Option<ResourceStats> {
        self.inner.store.get(value).map(|entry| entry.snapshot())
    }

    pub fn contains(&self, value: &T) -> bool {
        self.inner.store.contains(value)
    }

    /// Resources from head to tail
    pub fn vals(&self) -> Vec<T> {
        self.inner.ring.read().vals()
    }

    /// Number of tracked resources
    pub fn len(&self) -> usize {
        let _ring = self.inner.ring.read();
        self.inner.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get balancer metrics
    pub fn get_metrics(&self) -> BalancerMetrics {
        self.inner.metrics.get_metrics(self.len())
    }

    /// Export metrics
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.get_metrics().export()
    }

    /// Export metrics in Prometheus format
    pub fn export_metrics_prometheus(
        &self,
        balancer_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        MetricsExporter::export_prometheus(&self.get_metrics(), balancer_name, tags)
    }

    /// Get health status
    pub fn get_health_status(&self) -> HealthStatus {
        let mut error_counts = Vec::new();
        {
            let _ring = self.inner.ring.read();
            self.inner
                .store
                .for_each(|_, entry| error_counts.push(entry.snapshot().errors()));
        }
        HealthStatus::new(&error_counts, self.inner.policy)
    }

    fn select(&self, ring: &Ring<T>) -> BalancerResult<(T, Arc<StatsEntry>)> {
        let Some(value) = ring.first().cloned() else {
            MetricsTracker::increment(&self.inner.metrics.empty_events);
            return Err(BalancerError::EmptyPool);
        };

        match self.inner.store.get(&value) {
            Some(entry) => Ok((value, entry)),
            None => {
                MetricsTracker::increment(&self.inner.metrics.missing_stats_events);
                warn!(resource = ?value, "ring head has no stats entry");
                Err(BalancerError::MissingStats)
            }
        }
    }
}

/// Handle to a selected resource
///
/// Outcomes are committed against the stats record that was live when the
/// resource was selected. Dropping a lease commits nothing.
pub struct Lease<T: Resource> {
    value: T,
    entry: Arc<StatsEntry>,
    shared: Arc<Shared<T>>,
}

impl<T: Resource> fmt::Debug for Lease<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("value", &self.value)
            .field("entry", &self.entry.id)
            .finish()
    }
}

impl<T: Resource> Lease<T> {
    /// The selected resource
    pub fn data(&self) -> &T {
        &self.value
    }

    pub fn into_data(self) -> T {
        self.value
    }

    /// Record a use of the resource now
    pub fn mark_used(&self) {
        self.entry.mark_used(Instant::now());
    }

    /// Record a failure, evicting the resource once it crosses the threshold.
    ///
    /// Returns whether this call evicted it. A lease whose resource was
    /// already removed or re-added only counts against its own record.
    pub fn report(&self) -> bool {
        let errors = self.entry.record_failure();
        MetricsTracker::increment(&self.shared.metrics.failures_reported);
        debug!(resource = ?self.value, errors, "failure reported");

        if self.shared.policy.should_evict(errors) {
            return self.shared.evict(&self.value, &self.entry);
        }
        false
    }

    /// Whether this lease's record is still the live one for its resource
    pub fn is_current(&self) -> bool {
        self.shared
            .store
            .get(&self.value)
            .is_some_and(|current| Arc::ptr_eq(&current, &self.entry))
    }

    /// Snapshot of the lease's stats record
    pub fn stats(&self) -> ResourceStats {
        self.entry.snapshot()
    }

    /// Time left in the throttle window since the resource's last use
    pub fn remaining_wait(&self) -> Duration {
        self.entry
            .snapshot()
            .remaining_wait(self.shared.config.use_timeout, Instant::now())
    }

    /// Block the current thread until the throttle window has passed
    pub fn wait(&self) {
        let wait = self.remaining_wait();
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }

    /// Sleep on the tokio timer until the throttle window has passed
    pub async fn wait_async(&self) {
        let wait = self.remaining_wait();
        if !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }
}
