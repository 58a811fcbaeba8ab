//! Error types for the balancer

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BalancerError {
    #[error("Balancer is empty - no resources available")]
    EmptyPool,

    /// A ring node carries a value with no stats entry. Add and remove went
    /// out of sync, which only happens with duplicate identifiers.
    #[error("Resource at the head of the ring has no stats entry")]
    MissingStats,
}

pub type BalancerResult<T> = Result<T, BalancerError>;
