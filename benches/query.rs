//! Quadtree region query against the linear scan.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geo::{polygon, Polygon, Rect};
use polygon_quadtree::{brute_force, Execution, PairwiseOverlap, PolygonCollection, QuadTree, QuadTreeOptions};

/// Irregular pentagons on a jittered grid, none touching.
fn lakes(columns: u32) -> PolygonCollection {
    (0..columns * columns)
        .map(|i| {
            let (column, row) = (f64::from(i % columns), f64::from(i / columns));
            let jitter = f64::from(i * 7 % 11);
            let (x, y) = (column * 64. + 8. + jitter, row * 64. + 8. + jitter);
            let lake: Polygon = polygon![
                (x: x, y: y),
                (x: x + 30., y: y + 4.),
                (x: x + 38., y: y + 28.),
                (x: x + 18., y: y + 40.),
                (x: x + 2., y: y + 26.),
                (x: x, y: y)
            ];
            (u64::from(i), lake)
        })
        .collect()
}

fn region_query(c: &mut Criterion) {
    let collection = lakes(32);
    let bounds = Rect::new((0., 0.), (2048., 2048.));
    let tree = QuadTree::build(&collection, bounds, QuadTreeOptions::default()).unwrap();
    let region = Rect::new((400., 400.), (700., 700.));

    let mut group = c.benchmark_group("region_query");
    group.bench_function("quadtree", |b| {
        b.iter(|| tree.query(black_box(&collection), black_box(&region)))
    });
    group.bench_function("brute_force", |b| {
        b.iter(|| brute_force(black_box(&collection), black_box(&region), None))
    });
    group.finish();
}

fn pairwise(c: &mut Criterion) {
    let collection = lakes(12);
    let mut group = c.benchmark_group("pairwise");
    group.bench_function("serial", |b| {
        b.iter(|| collection.pairwise_overlaps(None, Execution::Serial))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| collection.pairwise_overlaps(None, Execution::Parallel { workers: None }))
    });
    group.finish();
}

criterion_group!(benches, region_query, pairwise);
criterion_main!(benches);
