//! Benchmarks for the CPU-side rain step.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use stormview::{ParticleField, RainSettings};

fn field(count: usize) -> ParticleField {
    ParticleField::new(&RainSettings {
        count,
        seed: Some(1),
        ..RainSettings::default()
    })
    .unwrap()
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("rain_tick");

    for count in [1_000, 30_000, 200_000] {
        group.bench_with_input(BenchmarkId::new("drops", count), &count, |b, &count| {
            let mut rain = field(count);
            b.iter(|| black_box(rain.tick(black_box(1.0 / 60.0))))
        });
    }

    group.finish();
}

fn bench_instance_upload(c: &mut Criterion) {
    let rain = field(30_000);
    let mut instances = Vec::with_capacity(rain.len());

    c.bench_function("collect_instances_30k", |b| {
        b.iter(|| {
            instances.clear();
            rain.for_each(|p| instances.push(stormview::uniforms::DropInstance::new(p)));
            black_box(instances.len())
        })
    });
}

criterion_group!(benches, bench_tick, bench_instance_upload);
criterion_main!(benches);
