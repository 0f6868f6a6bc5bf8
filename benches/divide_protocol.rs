//! Benchmarks for the division protocol.
//!
//! Run:
//! - cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fairslice::config::ProtocolConfig;
use fairslice::core::search::SearchParams;
use fairslice::core::segment::{Preferences, Segment};
use fairslice::core::valuation::grid_fraction;
use fairslice::protocol::divide;
use fairslice::protocol::equipartition::equipartition;

fn flat_prefs() -> Preferences {
    (0..4)
        .map(|i| vec![Segment::flat(i, 0.0, 1.0, 10.0)])
        .collect()
}

fn seesaw() -> Vec<Segment> {
    vec![
        Segment::flat(1, 0.0, 50.0, 10.0),
        Segment::flat(2, 50.0, 100.0, 5.0),
    ]
}

fn bench_grid_fraction(c: &mut Criterion) {
    let pref = seesaw();
    let mut group = c.benchmark_group("grid_fraction");
    for epsilon in [1e-3, 1e-5] {
        group.bench_with_input(
            BenchmarkId::from_parameter(epsilon),
            &epsilon,
            |b, &epsilon| {
                b.iter(|| {
                    grid_fraction(black_box(&pref), epsilon, 13.7, 88.2, 100.0).unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_equipartition(c: &mut Criterion) {
    let pref = seesaw();
    let params = SearchParams::default();
    c.bench_function("equipartition_seesaw", |b| {
        b.iter(|| equipartition(black_box(&pref), 100.0, 1e-4, 0.0, 100.0, &params).unwrap())
    });
}

fn bench_divide_flat(c: &mut Criterion) {
    let prefs = flat_prefs();
    let config = ProtocolConfig::default();
    c.bench_function("divide_identical_flat", |b| {
        b.iter(|| divide(black_box(&prefs), 1.0, &config).unwrap())
    });
}

criterion_group!(
    benches,
    bench_grid_fraction,
    bench_equipartition,
    bench_divide_flat
);
criterion_main!(benches);
