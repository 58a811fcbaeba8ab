//! # Esox Balancer
//!
//! Thread-safe round-robin rotation over a pool of interchangeable
//! resources, with per-resource failure tracking and reuse throttling.
//!
//! ## Features
//!
//! - O(1) selection and rotation over an index-linked ring
//! - Leases that defer stats updates until the caller knows the outcome
//! - Automatic eviction once a resource exceeds its failure threshold
//! - Non-blocking throttle reservations with a minimum reuse interval
//! - Health monitoring and metrics
//! - Prometheus metrics export
//!
//! ## Quick Start
//!
//! ```rust
//! use esox_balancer::{Balancer, BalancerConfiguration};
//!
//! let balancer = Balancer::new(BalancerConfiguration::new().with_max_errors(2));
//! balancer.add(["10.0.0.1:80", "10.0.0.2:80"]);
//!
//! let lease = balancer.acquire().unwrap();
//! println!("Using: {}", lease.data());
//! lease.mark_used();
//!
//! assert_eq!(balancer.peek(), Some("10.0.0.2:80"));
//! ```

mod balancer;
mod config;
mod errors;
mod eviction;
mod health;
mod metrics;
mod ring;
mod stats;
mod store;

pub use balancer::{Balancer, Lease, Resource};
pub use config::BalancerConfiguration;
pub use errors::{BalancerError, BalancerResult};
pub use eviction::EvictionPolicy;
pub use health::HealthStatus;
pub use metrics::{BalancerMetrics, MetricsExporter};
pub use ring::{Iter, Ring};
pub use stats::ResourceStats;
pub use store::ConcurrentStore;
