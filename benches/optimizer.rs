//! Benchmarks for the tile placement optimizer.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use tileplan::geometry::distinct_rotations;
use tileplan::placement::Placements;
use tileplan::relations::Relations;
use tileplan::search::SearchLimits;
use tileplan::{optimize, Problem};

/// Benchmark the full pipeline on the demo problem.
fn bench_optimize_demo(c: &mut Criterion) {
    let problem = Problem::demo().expect("demo problem is valid");

    c.bench_function("optimize_demo", |b| {
        b.iter(|| optimize(black_box(&problem), SearchLimits::default()))
    });
}

/// Benchmark computing the distinct rotations of every demo tile.
fn bench_rotations(c: &mut Criterion) {
    let problem = Problem::demo().expect("demo problem is valid");
    let shapes: Vec<_> = problem.catalog.shapes().iter().map(|s| s.cells()).collect();

    c.bench_function("distinct_rotations", |b| {
        b.iter(|| {
            for cells in &shapes {
                black_box(distinct_rotations(black_box(cells)));
            }
        })
    });
}

/// Benchmark enumerating placements on a larger board.
fn bench_enumerate(c: &mut Criterion) {
    let problem = Problem::demo().expect("demo problem is valid");
    let grid = tileplan::grid::Grid::new(12, 12).expect("grid is valid");

    c.bench_function("enumerate_12x12", |b| {
        b.iter(|| Placements::enumerate(black_box(&problem.catalog), black_box(&grid)))
    });
}

/// Benchmark compiling overlap and adjacency relations on a larger board.
fn bench_relations(c: &mut Criterion) {
    let problem = Problem::demo().expect("demo problem is valid");
    let grid = tileplan::grid::Grid::new(12, 12).expect("grid is valid");
    let placements = Placements::enumerate(&problem.catalog, &grid).expect("placements fit");

    c.bench_function("relations_12x12", |b| {
        b.iter(|| Relations::compile(black_box(&grid), black_box(&placements)))
    });
}

criterion_group!(
    benches,
    bench_optimize_demo,
    bench_rotations,
    bench_enumerate,
    bench_relations
);
criterion_main!(benches);
