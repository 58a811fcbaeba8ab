// Esox Balancer
// Thread-safe round-robin resource rotation with eviction and throttling

// This is just a binary wrapper - the actual library is in lib.rs
// Set RUST_LOG=debug to see the balancer's own events

use esox_balancer::{Balancer, BalancerConfiguration};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("=== Esox Balancer ===");
    println!();

    let config = BalancerConfiguration::new()
        .with_max_errors(1)
        .with_use_timeout(Duration::from_millis(200));
    let balancer = Balancer::with_resources(["alpha", "beta", "gamma"], config);

    println!("Round robin:");
    for _ in 0..4 {
        match balancer.acquire() {
            Ok(lease) => {
                println!("  Selected: {}", lease.data());
                lease.mark_used();
            }
            Err(err) => println!("  {}", err),
        }
    }

    println!("Failures:");
    for _ in 0..2 {
        if let Ok(lease) = balancer.acquire() {
            let evicted = lease.report();
            println!("  Reported {} (evicted: {})", lease.data(), evicted);
        }
    }
    println!("  Remaining: {:?}", balancer.vals());

    println!("Throttling:");
    if let Some((value, wait)) = balancer.try_acquire_with_timeout() {
        println!("  {} ready in {:?}", value, wait);
    }

    println!();
    for (name, value) in balancer.export_metrics() {
        println!("  {}: {}", name, value);
    }
}
