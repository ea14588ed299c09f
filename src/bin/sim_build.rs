//! Demo driver: build a box blueprint inside the in-memory world
//!
//! Runs a full build job (material check, build passes, repair rounds,
//! scaffold cleanup) against `SimWorld` and prints the final report as
//! JSON. Useful for eyeballing pass behavior with RUST_LOG=debug.

use clap::Parser;

use blockwright::blueprint::{Cell, Orientation, Site};
use blockwright::core::types::{BlockPos, MaterialCatalog, MaterialKind};
use blockwright::core::EngineConfig;
use blockwright::engine::BuildJob;
use blockwright::world::SimWorld;

#[derive(Parser, Debug)]
#[command(name = "sim_build", about = "Run a box build job in the simulated world")]
struct Args {
    /// Box size along x
    #[arg(long, default_value_t = 5)]
    width: i32,

    /// Box size along y
    #[arg(long, default_value_t = 4)]
    height: i32,

    /// Box size along z
    #[arg(long, default_value_t = 5)]
    depth: i32,

    /// Keep the interior empty (walls, floor and roof only)
    #[arg(long)]
    hollow: bool,

    /// How much building material the agent starts with
    #[arg(long, default_value_t = 500)]
    stock: u32,
}

fn box_cells(args: &Args, material: blockwright::core::types::MaterialId) -> Vec<Cell> {
    let mut cells = Vec::new();
    for y in 0..args.height {
        for x in 0..args.width {
            for z in 0..args.depth {
                let shell = x == 0
                    || x == args.width - 1
                    || z == 0
                    || z == args.depth - 1
                    || y == 0
                    || y == args.height - 1;
                if args.hollow && !shell {
                    continue;
                }
                cells.push(Cell {
                    pos: BlockPos::new(x, y, z),
                    material,
                });
            }
        }
    }
    cells
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut catalog = MaterialCatalog::new();
    let brick = catalog.register("brick", MaterialKind::Block);
    let dirt = catalog.register("dirt", MaterialKind::Scaffold);
    let bedrock = catalog.register("bedrock", MaterialKind::Block);

    let mut world = SimWorld::with_floor(-1, bedrock);
    world.stock(brick, args.stock);
    world.stock(dirt, 64);

    let site = Site::new(BlockPos::new(0, 0, 0), Orientation::North);
    let cells = box_cells(&args, brick);
    let mut job = match BuildJob::load(cells, site, &catalog) {
        Ok(job) => job,
        Err(err) => {
            tracing::error!("Load failed: {err}");
            std::process::exit(1);
        }
    };

    let summary = job.blueprint().summary(&catalog);
    tracing::info!(
        "Blueprint: {}x{}x{}, {} blocks",
        summary.size.x,
        summary.size.y,
        summary.size.z,
        summary.cell_count
    );

    let mut progress = |placed: u32, total: u32| {
        if placed % 10 == 0 || placed == total {
            tracing::info!("Progress: {placed}/{total}");
        }
    };

    match job.run(&mut world, &catalog, &EngineConfig::instant(), &mut progress) {
        Ok(report) => {
            println!(
                "{}",
                serde_json::to_string_pretty(report).expect("report serializes")
            );
        }
        Err(err) => {
            tracing::error!("Build failed: {err}");
            std::process::exit(1);
        }
    }
}
