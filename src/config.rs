//! Balancer configuration options

use crate::eviction::EvictionPolicy;
use std::time::Duration;

/// Configuration for balancer behavior
///
/// # Examples
///
/// ```
/// use esox_balancer::BalancerConfiguration;
/// use std::time::Duration;
///
/// let config = BalancerConfiguration::new()
///     .with_max_errors(3)
///     .with_use_timeout(Duration::from_millis(500));
///
/// assert_eq!(config.max_errors, Some(3));
/// assert_eq!(config.use_timeout, Some(Duration::from_millis(500)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalancerConfiguration {
    /// Number of reported failures a resource may accumulate before the next
    /// one evicts it. `None` disables eviction.
    pub max_errors: Option<usize>,

    /// Minimum spacing between two uses of the same resource
    pub use_timeout: Option<Duration>,
}

impl BalancerConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the failure threshold
    ///
    /// # Examples
    ///
    /// ```
    /// use esox_balancer::{BalancerConfiguration, EvictionPolicy};
    ///
    /// let config = BalancerConfiguration::new().with_max_errors(0);
    ///
    /// assert_eq!(config.eviction_policy(), EvictionPolicy::MaxErrors(0));
    /// ```
    pub fn with_max_errors(mut self, max_errors: usize) -> Self {
        self.max_errors = Some(max_errors);
        self
    }

    /// Set the reuse throttle window
    pub fn with_use_timeout(mut self, timeout: Duration) -> Self {
        self.use_timeout = Some(timeout);
        self
    }

    pub fn eviction_policy(&self) -> EvictionPolicy {
        match self.max_errors {
            Some(max) => EvictionPolicy::MaxErrors(max),
            None => EvictionPolicy::Never,
        }
    }
}
