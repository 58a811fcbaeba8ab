use criterion::{Criterion, black_box, criterion_group, criterion_main};
use esox_balancer::{Balancer, BalancerConfiguration, Ring};
use std::time::Duration;

fn ring_rotation(c: &mut Criterion) {
    let mut ring = Ring::new();
    for i in 0..1024 {
        ring.add_last(i);
    }

    c.bench_function("ring_rotate_1024", |b| {
        b.iter(|| {
            ring.rotate();
            black_box(ring.first());
        })
    });
}

fn balancer_acquire(c: &mut Criterion) {
    let balancer = Balancer::new(BalancerConfiguration::new().with_max_errors(3));
    balancer.add(0..64);

    c.bench_function("balancer_acquire_mark_used", |b| {
        b.iter(|| {
            let lease = balancer.acquire().unwrap();
            lease.mark_used();
            black_box(lease.data());
        })
    });

    let config = BalancerConfiguration::new().with_use_timeout(Duration::from_millis(10));
    let throttled = Balancer::new(config);
    throttled.add(0..64);

    c.bench_function("balancer_acquire_with_timeout", |b| {
        b.iter(|| black_box(throttled.acquire_with_timeout().unwrap()))
    });
}

criterion_group!(benches, ring_rotation, balancer_acquire);
criterion_main!(benches);
