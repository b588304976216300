// Benchmark for the per-tick target pipeline and velocity law
// Run with: cargo bench

use criterion::{criterion_group, criterion_main, Criterion};
use hand_follow_rs::config::Config;
use hand_follow_rs::{AxisMapper, Position3, VelocityController, WorkspaceGuard};
use std::hint::black_box;

fn bench_target_pipeline(c: &mut Criterion) {
    let config = Config::default();
    let mapper = AxisMapper::new(&config.mapping);
    let guard = WorkspaceGuard::new(config.workspace).unwrap();
    let controller = VelocityController::new(&config.control);
    let center = Position3::new(0.5, 0.0, 0.5);
    let samples: Vec<Position3> = (0..10_000)
        .map(|i| {
            let t = i as f64 * 0.01;
            Position3::new(40.0 * t.sin(), 30.0 * t.cos(), 120.0 * (0.5 * t).sin())
        })
        .collect();

    c.bench_function("map + clamp + velocity (10k samples)", |b| {
        b.iter(|| {
            let mut commanded = 0;
            for sample in &samples {
                let target = guard.clamp(center + mapper.map(*sample)).unwrap();
                let velocity = controller.velocity(target, black_box(center));
                if !velocity.is_zero() {
                    commanded += 1;
                }
            }
            black_box(commanded)
        });
    });
}

criterion_group!(benches, bench_target_pipeline);
criterion_main!(benches);
