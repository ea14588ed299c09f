//! Convergence benchmarks for the placement engine
//!
//! Measured against the in-memory world, so the numbers isolate
//! engine-side work (pass sweeps, exclusion lookups, scaffold
//! bookkeeping) from collaborator latency.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use blockwright::blueprint::{Cell, Orientation, Site};
use blockwright::core::types::{BlockPos, MaterialCatalog, MaterialId, MaterialKind};
use blockwright::core::EngineConfig;
use blockwright::engine::BuildJob;
use blockwright::world::SimWorld;

fn catalog() -> (MaterialCatalog, MaterialId, MaterialId) {
    let mut catalog = MaterialCatalog::new();
    let stone = catalog.register("stone", MaterialKind::Block);
    let dirt = catalog.register("dirt", MaterialKind::Scaffold);
    (catalog, stone, dirt)
}

fn cube(n: i32, material: MaterialId) -> Vec<Cell> {
    let mut cells = Vec::with_capacity((n * n * n) as usize);
    for y in 0..n {
        for x in 0..n {
            for z in 0..n {
                cells.push(Cell {
                    pos: BlockPos::new(x, y, z),
                    material,
                });
            }
        }
    }
    cells
}

fn platform(n: i32, y: i32, material: MaterialId) -> Vec<Cell> {
    let mut cells = Vec::with_capacity((n * n) as usize);
    for x in 0..n {
        for z in 0..n {
            cells.push(Cell {
                pos: BlockPos::new(x, y, z),
                material,
            });
        }
    }
    cells
}

fn run(cells: Vec<Cell>, world: &mut SimWorld, catalog: &MaterialCatalog) {
    let site = Site::new(BlockPos::new(0, 0, 0), Orientation::North);
    let mut job = BuildJob::load(cells, site, catalog).expect("valid blueprint");
    job.run(world, catalog, &EngineConfig::instant(), &mut |_, _| {})
        .expect("job should not fault");
}

fn bench_cube_build(c: &mut Criterion) {
    let (catalog, stone, dirt) = catalog();
    let mut group = c.benchmark_group("cube_build");
    for n in [4, 8, 12] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let mut world = SimWorld::with_floor(-1, stone);
                world.stock(stone, (n * n * n) as u32);
                world.stock(dirt, 64);
                run(black_box(cube(n, stone)), &mut world, &catalog);
                world.mutation_count()
            });
        });
    }
    group.finish();
}

fn bench_idempotent_verify(c: &mut Criterion) {
    let (catalog, stone, dirt) = catalog();
    let n = 8;
    let mut world = SimWorld::with_floor(-1, stone);
    world.stock(stone, (2 * n * n * n) as u32);
    world.stock(dirt, 64);
    run(cube(n, stone), &mut world, &catalog);

    // The structure already stands; each iteration is a pure
    // verify-and-sweep over a satisfied world.
    c.bench_function("idempotent_verify", |b| {
        b.iter(|| {
            run(black_box(cube(n, stone)), &mut world, &catalog);
            world.mutation_count()
        });
    });
}

fn bench_scaffolded_platform(c: &mut Criterion) {
    let (catalog, stone, dirt) = catalog();
    c.bench_function("scaffolded_platform", |b| {
        b.iter(|| {
            let mut world = SimWorld::with_floor(-1, stone);
            world.stock(stone, 64);
            world.stock(dirt, 256);
            run(black_box(platform(6, 4, stone)), &mut world, &catalog);
            world.mutation_count()
        });
    });
}

criterion_group!(
    benches,
    bench_cube_build,
    bench_scaffolded_platform,
    bench_idempotent_verify
);
criterion_main!(benches);