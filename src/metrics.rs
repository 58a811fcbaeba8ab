//! Metrics collection and export for balancers

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metrics data for a balancer
///
/// # Examples
///
/// ```
/// use esox_balancer::{Balancer, BalancerConfiguration};
///
/// let balancer = Balancer::new(BalancerConfiguration::default());
/// balancer.add(["a", "b"]);
///
/// let lease = balancer.acquire().unwrap();
/// lease.report();
///
/// let metrics = balancer.get_metrics();
/// assert_eq!(metrics.total_acquired, 1);
/// assert_eq!(metrics.failures_reported, 1);
/// assert_eq!(metrics.tracked_resources, 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "metrics", derive(serde::Serialize))]
pub struct BalancerMetrics {
    /// Successful selections, throttled or not
    pub total_acquired: usize,

    /// Selections made through the throttled path
    pub throttled_acquired: usize,

    /// Selections that found the ring empty
    pub empty_events: usize,

    /// Selections that found a ring value without stats
    pub missing_stats_events: usize,

    /// Failures reported against leases
    pub failures_reported: usize,

    /// Resources removed by the failure threshold
    pub evictions: usize,

    /// Resources currently tracked
    pub tracked_resources: usize,
}

impl BalancerMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_acquired".to_string(), self.total_acquired.to_string());
        metrics.insert("throttled_acquired".to_string(), self.throttled_acquired.to_string());
        metrics.insert("empty_events".to_string(), self.empty_events.to_string());
        metrics.insert("missing_stats_events".to_string(), self.missing_stats_events.to_string());
        metrics.insert("failures_reported".to_string(), self.failures_reported.to_string());
        metrics.insert("evictions".to_string(), self.evictions.to_string());
        metrics.insert("tracked_resources".to_string(), self.tracked_resources.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_balancer::{Balancer, BalancerConfiguration};
    /// use std::collections::HashMap;
    ///
    /// let balancer = Balancer::new(BalancerConfiguration::default());
    /// balancer.add(["10.0.0.1:80"]);
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("service".to_string(), "api".to_string());
    ///
    /// let output = balancer.export_metrics_prometheus("upstreams", Some(&tags));
    /// assert!(output.contains("balancer_resources_tracked{balancer=\"upstreams\""));
    /// assert!(output.contains("service=\"api\""));
    /// ```
    pub fn export_prometheus(
        metrics: &BalancerMetrics,
        balancer_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(balancer_name, tags);

        Self::push_metric(
            &mut output,
            "balancer_resources_tracked",
            "Resources currently in rotation",
            "gauge",
            &labels,
            metrics.tracked_resources,
        );
        Self::push_metric(
            &mut output,
            "balancer_acquired_total",
            "Successful resource selections",
            "counter",
            &labels,
            metrics.total_acquired,
        );
        Self::push_metric(
            &mut output,
            "balancer_throttled_acquired_total",
            "Selections through the throttled path",
            "counter",
            &labels,
            metrics.throttled_acquired,
        );
        Self::push_metric(
            &mut output,
            "balancer_events_empty_total",
            "Selections against an empty balancer",
            "counter",
            &labels,
            metrics.empty_events,
        );
        Self::push_metric(
            &mut output,
            "balancer_events_missing_stats_total",
            "Selections that hit a resource without stats",
            "counter",
            &labels,
            metrics.missing_stats_events,
        );
        Self::push_metric(
            &mut output,
            "balancer_failures_reported_total",
            "Failures reported against leases",
            "counter",
            &labels,
            metrics.failures_reported,
        );
        Self::push_metric(
            &mut output,
            "balancer_evictions_total",
            "Resources evicted by the failure threshold",
            "counter",
            &labels,
            metrics.evictions,
        );

        output
    }

    fn push_metric(
        output: &mut String,
        name: &str,
        help: &str,
        kind: &str,
        labels: &str,
        value: usize,
    ) {
        output.push_str(&format!("# HELP {} {}\n", name, help));
        output.push_str(&format!("# TYPE {} {}\n", name, kind));
        output.push_str(&format!("{}{{{}}} {}\n", name, labels, value));
    }

    fn format_labels(balancer_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("balancer=\"{}\"", balancer_name)];

        if let Some(tags) = tags {
            let mut tags: Vec<_> = tags.iter().collect();
            tags.sort();
            for (key, value) in tags {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal metrics tracker
#[derive(Debug, Default)]
pub(crate) struct MetricsTracker {
    pub total_acquired: AtomicUsize,
    pub throttled_acquired: AtomicUsize,
    pub empty_events: AtomicUsize,
    pub missing_stats_events: AtomicUsize,
    pub failures_reported: AtomicUsize,
    pub evictions: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_metrics(&self, tracked: usize) -> BalancerMetrics {
        BalancerMetrics {
            total_acquired: self.total_acquired.load(Ordering::Relaxed),
            throttled_acquired: self.throttled_acquired.load(Ordering::Relaxed),
            empty_events: self.empty_events.load(Ordering::Relaxed),
            missing_stats_events: self.missing_stats_events.load(Ordering::Relaxed),
            failures_reported: self.failures_reported.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            tracked_resources: tracked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_contains_every_counter() {
        let tracker = MetricsTracker::new();
        MetricsTracker::increment(&tracker.evictions);
        MetricsTracker::increment(&tracker.evictions);

        let exported = tracker.get_metrics(3).export();
        assert_eq!(exported.len(), 7);
        assert_eq!(exported["evictions"], "2");
        assert_eq!(exported["tracked_resources"], "3");
    }

    #[test]
    fn test_prometheus_labels_are_sorted() {
        let metrics = MetricsTracker::new().get_metrics(0);
        let mut tags = HashMap::new();
        tags.insert("zone".to_string(), "b".to_string());
        tags.insert("app".to_string(), "a".to_string());

        let output = MetricsExporter::export_prometheus(&metrics, "lb", Some(&tags));
        let expected = "balancer_evictions_total{balancer=\"lb\",app=\"a\",zone=\"b\"} 0\n";
        assert!(output.contains(expected));
        assert!(output.contains("# TYPE balancer_resources_tracked gauge\n"));
    }
}
