//! Health monitoring for balancers

use crate::eviction::EvictionPolicy;

/// Health status of a balancer
///
/// # Examples
///
/// ```
/// use esox_balancer::{Balancer, BalancerConfiguration};
///
/// let balancer = Balancer::new(BalancerConfiguration::new().with_max_errors(2));
/// balancer.add([1, 2, 3]);
///
/// let health = balancer.get_health_status();
/// assert!(health.is_healthy());
/// assert_eq!(health.tracked_resources, 3);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "metrics", derive(serde::Serialize))]
pub struct HealthStatus {
    /// Whether the balancer is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Resources currently in rotation
    pub tracked_resources: usize,

    /// Resources with at least one reported failure
    pub degraded_resources: usize,

    /// Resources the next failure will evict
    pub last_strike_resources: usize,

    /// Fraction of tracked resources that are degraded (0.0 to 1.0)
    pub error_ratio: f64,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Build a status from the error counts of every tracked resource
    pub fn new(error_counts: &[usize], policy: EvictionPolicy) -> Self {
        let tracked = error_counts.len();
        let degraded = error_counts.iter().filter(|count| **count > 0).count();
        let last_strike = error_counts
            .iter()
            .filter(|count| policy.is_last_strike(**count))
            .count();

        let error_ratio = if tracked > 0 {
            degraded as f64 / tracked as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        if tracked == 0 {
            warnings.push("Balancer is empty".to_string());
            is_healthy = false;
        }

        if error_ratio > 0.5 {
            warnings.push(format!("High error ratio: {:.1}%", error_ratio * 100.0));
            is_healthy = false;
        }

        if last_strike > 0 {
            warnings.push(format!("{} resource(s) one failure from eviction", last_strike));
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            tracked_resources: tracked,
            degraded_resources: degraded,
            last_strike_resources: last_strike,
            error_ratio,
            warnings,
        }
    }

    /// Check if the balancer is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_unhealthy() {
        let status = HealthStatus::new(&[], EvictionPolicy::Never);
        assert!(!status.is_healthy());
        assert_eq!(status.warning_count, 1);
    }

    #[test]
    fn test_majority_degraded_is_unhealthy() {
        let status = HealthStatus::new(&[1, 2, 0], EvictionPolicy::MaxErrors(2));
        assert!(!status.is_healthy());
        assert_eq!(status.degraded_resources, 2);
        assert_eq!(status.last_strike_resources, 1);
        assert_eq!(status.warning_count, 2);
    }

    #[test]
    fn test_last_strike_alone_only_warns() {
        let status = HealthStatus::new(&[0, 0, 1], EvictionPolicy::MaxErrors(1));
        assert!(status.is_healthy());
        assert_eq!(status.last_strike_resources, 1);
        assert_eq!(status.warnings.len(), 1);
    }
}
