//! Space stepping and broad-phase benchmarks.
//!
//! Run: cargo bench --bench step_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use phys2d_engine::bodies::{moment_for_circle, moment_for_polygon};
use phys2d_engine::collision::SpaceHash;
use phys2d_engine::math::Aabb;
use phys2d_engine::{Body, Material, Shape, Space, Vector2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DT: f32 = 1.0 / 60.0;

fn floor_space() -> Space {
    let mut space = Space::new();
    space.set_gravity(Vector2::new(0.0, 300.0));
    space.resize_active_hash(30.0, 999).expect("cell size");

    let floor = Shape::segment(
        space.static_body(),
        Vector2::new(-600.0, 160.0),
        Vector2::new(600.0, 160.0),
        0.0,
    )
    .with_material(Material::new(1.0, 1.0));
    space.add_static_shape(floor).expect("floor");
    space
}

/// Columns of stacked boxes resting on the floor
fn box_stack_space(columns: usize, rows: usize) -> Space {
    let mut space = floor_space();
    let verts = [
        Vector2::new(-10.0, -10.0),
        Vector2::new(-10.0, 10.0),
        Vector2::new(10.0, 10.0),
        Vector2::new(10.0, -10.0),
    ];

    for column in 0..columns {
        for row in 0..rows {
            let mut body = Body::new(1.0, moment_for_polygon(1.0, &verts, Vector2::zero()));
            body.set_position(Vector2::new(
                column as f32 * 30.0 - 300.0,
                150.0 - row as f32 * 20.0,
            ));
            let body = space.add_body(body).expect("box body");

            let shape = Shape::polygon(body, &verts, Vector2::zero())
                .expect("box shape")
                .with_material(Material::new(0.0, 0.7));
            space.add_shape(shape).expect("box");
        }
    }

    space
}

/// Circles dropped at random over the floor
fn ball_pit_space(count: usize) -> Space {
    let mut space = floor_space();
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..count {
        let radius = rng.gen_range(4.0..10.0);
        let mut body = Body::new(1.0, moment_for_circle(1.0, 0.0, radius, Vector2::zero()));
        body.set_position(Vector2::new(
            rng.gen_range(-500.0..500.0),
            rng.gen_range(-400.0..140.0),
        ));
        let body = space.add_body(body).expect("ball body");

        let shape = Shape::circle(body, radius, Vector2::zero()).with_material(Material::new(0.2, 0.5));
        space.add_shape(shape).expect("ball");
    }

    space
}

fn bench_step(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("step/box_stack");
        for &columns in &[5, 10, 20] {
            let mut space = box_stack_space(columns, 10);
            // Let the stacks settle so contacts are warm
            for _ in 0..60 {
                space.step(DT);
            }
            group.bench_with_input(BenchmarkId::from_parameter(columns * 10), &columns, |b, _| {
                b.iter(|| space.step(black_box(DT)));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("step/ball_pit");
        for &count in &[100, 500, 1000] {
            let mut space = ball_pit_space(count);
            group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
                b.iter(|| space.step(black_box(DT)));
            });
        }
        group.finish();
    }
}

fn bench_query_rehash(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadphase/query_rehash");
    for &count in &[100u32, 1000, 5000] {
        let mut rng = StdRng::seed_from_u64(7);
        let mut hash = SpaceHash::new(20.0, count as usize * 2);
        for id in 0..count {
            let center = Vector2::new(rng.gen_range(0.0..2000.0), rng.gen_range(0.0..2000.0));
            let half = Vector2::new(8.0, 8.0);
            hash.insert(id, Aabb::new(center - half, center + half));
        }

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                let mut pairs = 0usize;
                hash.query_rehash(|_, _| pairs += 1);
                black_box(pairs)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step, bench_query_rehash);
criterion_main!(benches);
