//! Eviction policies for automatic resource removal

/// Decides when accumulated failures take a resource out of rotation
///
/// # Examples
///
/// ```
/// use esox_balancer::EvictionPolicy;
///
/// let policy = EvictionPolicy::MaxErrors(1);
///
/// assert!(!policy.should_evict(1));
/// assert!(policy.should_evict(2));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Failures are counted but never evict
    #[default]
    Never,

    /// Evict once the error count exceeds the threshold
    MaxErrors(usize),
}

impl EvictionPolicy {
    pub fn should_evict(&self, error_count: usize) -> bool {
        match self {
            EvictionPolicy::Never => false,
            EvictionPolicy::MaxErrors(max) => error_count > *max,
        }
    }

    /// Whether a resource with `error_count` failures is evicted by the next one
    pub fn is_last_strike(&self, error_count: usize) -> bool {
        match self {
            EvictionPolicy::Never => false,
            EvictionPolicy::MaxErrors(max) => error_count == *max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_policy() {
        assert!(!EvictionPolicy::Never.should_evict(usize::MAX));
        assert!(!EvictionPolicy::Never.is_last_strike(0));
    }

    #[test]
    fn test_zero_threshold_evicts_on_first_failure() {
        let policy = EvictionPolicy::MaxErrors(0);
        assert!(policy.is_last_strike(0));
        assert!(!policy.should_evict(0));
        assert!(policy.should_evict(1));
    }
}
