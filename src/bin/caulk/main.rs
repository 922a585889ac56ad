//! Caulk CLI - mesh hole repair command-line tool.
//!
//! Usage: caulk <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `caulk --help` for available commands. Set `RUST_LOG=debug` for
//! per-hole details.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};

use caulk::algo::repair::{find_boundary_loops, FillOptions, DEFAULT_PLANAR_TOLERANCE};
use caulk::algo::LogDiagnostics;
use caulk::io;
use caulk::mesh::HalfEdgeMesh;
use caulk::session::RepairSession;

#[derive(Parser)]
#[command(name = "caulk")]
#[command(author, version, about = "Mesh hole repair CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information and list its holes
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Fill the holes of a mesh
    Fill {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Leave holes with more boundary edges than this open
        #[arg(short, long)]
        max_hole_size: Option<usize>,

        /// Distance tolerance for classifying a hole as planar
        #[arg(short, long, default_value_t = DEFAULT_PLANAR_TOLERANCE)]
        tolerance: f64,

        /// Keep deleted elements in storage instead of compacting
        #[arg(long)]
        keep_garbage: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Fill {
            input,
            output,
            max_hole_size,
            tolerance,
            keep_garbage,
        } => {
            let mut options = FillOptions::default()
                .with_planar_tolerance(tolerance)
                .with_collect_garbage(!keep_garbage);
            if let Some(max) = max_hole_size {
                options = options.with_max_hole_size(max);
            }
            cmd_fill(&input, &output, options)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh: HalfEdgeMesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());
    println!("Surface area: {:.6}", mesh.surface_area());

    if let Some((min, max)) = mesh.bounding_box() {
        println!("Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z);
        let diag = max - min;
        println!("Dimensions: {:.3} x {:.3} x {:.3}", diag.x, diag.y, diag.z);
    }

    println!("Texture coordinates: {}", if mesh.has_tex_coords() { "yes" } else { "no" });

    let loops = find_boundary_loops(&mesh);
    if loops.is_empty() {
        println!("Topology: Closed (no holes)");
        return Ok(());
    }

    println!("Topology: Open ({} hole(s), {} boundary edges)",
        loops.len(), mesh.num_boundary_halfedges());
    for (i, hole) in loops.iter().enumerate() {
        let status = match hole.check_manifold(&mesh) {
            Ok(()) => "fillable".to_string(),
            Err(e) => format!("not fillable: {}", e),
        };
        println!("  Hole {}: {} edges, {}", i, hole.len(), status);
    }

    Ok(())
}

fn cmd_fill(
    input: &PathBuf,
    output: &PathBuf,
    options: FillOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = RepairSession::with_diagnostics(LogDiagnostics);
    session.set_fill_options(options)?;
    session.read(input)?;

    let before = session.check();
    println!("Loaded: {} vertices, {} faces, {} hole(s)", before.vertices, before.faces, before.holes);

    let start = Instant::now();
    let report = session.fill_hole();
    let elapsed = start.elapsed();

    for (i, hole) in report.holes.iter().enumerate() {
        if let Err(e) = &hole.outcome {
            println!("  Hole {} ({} edges) left open: {}", i, hole.boundary_len, e);
        }
    }
    if report.fallback_count() > 0 {
        println!("Warning: {} hole(s) closed by fan fallback; check them visually",
            report.fallback_count());
    }

    let after = session.check();
    println!("Filled {} of {} hole(s), {} face(s) added",
        report.holes_filled(), report.holes_found(), report.faces_added());
    println!("Result: {} vertices, {} faces, {} hole(s)", after.vertices, after.faces, after.holes);

    io::save(session.mesh(), output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
