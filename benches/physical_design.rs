//! Exact physical design benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fcn_layout::{ClockedLayout, Tile};
use fcn_network::blueprints;
use fcn_place_route::{a_star, exact, AStarParams, ExactParams};
use fcn_verify::{critical_path_length_and_throughput, gate_level_drvs, DrvParams};
use std::time::Duration;

fn benchmark_exact(c: &mut Criterion) {
    let cases = vec![
        ("and_or", "USE"),
        ("maj1", "RES"),
        ("inverter", "2DDWave"),
        ("half_adder", "2DDWave"),
    ];

    let mut group = c.benchmark_group("exact");
    group.sample_size(10);
    group.measurement_time(Duration::from_secs(10));

    for (name, scheme) in cases {
        let Some(ntk) = blueprints::by_name(name) else {
            continue;
        };
        let params = ExactParams {
            crossings: true,
            ..ExactParams::with_scheme(scheme)
        };
        group.bench_with_input(BenchmarkId::new(scheme, name), &ntk, |b, ntk| {
            b.iter(|| black_box(exact(ntk, &params, None).ok().flatten().map(|l| l.num_wires())));
        });
    }
    group.finish();
}

fn benchmark_analysis(c: &mut Criterion) {
    let ntk = blueprints::and_or_network();
    let Ok(Some(lyt)) = exact(&ntk, &ExactParams::with_scheme("USE"), None) else {
        return;
    };

    c.bench_function("drv_check", |b| {
        b.iter(|| black_box(gate_level_drvs(&lyt, &DrvParams::default(), None).drvs))
    });
    c.bench_function("critical_path", |b| {
        b.iter(|| black_box(critical_path_length_and_throughput(&lyt).throughput))
    });
}

fn benchmark_a_star(c: &mut Criterion) {
    let mut group = c.benchmark_group("a_star");

    for size in [8u32, 32, 64] {
        let Ok(lyt) = ClockedLayout::with_scheme_name(Tile::new(size - 1, size - 1, 0), "USE") else {
            continue;
        };
        let target = Tile::new(size - 1, size - 1, 0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &lyt, |b, lyt| {
            b.iter(|| black_box(a_star(lyt, Tile::new(0, 0, 0), target, &AStarParams::default())));
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_exact, benchmark_analysis, benchmark_a_star);
criterion_main!(benches);
