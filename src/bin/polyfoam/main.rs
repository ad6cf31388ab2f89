//! Polyfoam CLI - converts volume meshes to OpenFOAM polyMesh directories.
//!
//! Usage: polyfoam <COMMAND> [OPTIONS] <INPUT>
//!
//! Run `polyfoam --help` for available commands.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{ArgAction, Parser, Subcommand};

use polyfoam::algo::{self, ConvertOptions, Progress};
use polyfoam::io;
use polyfoam::mesh::{GroupKind, MeshSource, PatchType};

#[derive(Parser)]
#[command(name = "polyfoam")]
#[command(author, version, about = "Volume mesh to OpenFOAM polyMesh converter", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a mesh to a polyMesh directory
    Convert {
        /// Input mesh file
        input: PathBuf,

        /// Output directory (default: <mesh name>/constant/polyMesh)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Check and repair the winding of internal faces
        #[arg(long)]
        verify_orientation: bool,

        /// Type of patches whose name does not contain "wall"
        #[arg(long, value_parser = parse_patch_type, default_value = "wall")]
        default_patch_type: PatchType,

        /// Type of one patch, as NAME=TYPE (repeatable)
        #[arg(long = "patch-type", value_parser = parse_patch_override)]
        patch_types: Vec<(String, PatchType)>,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Display mesh information without converting
    Info {
        /// Input mesh file
        input: PathBuf,
    },
}

fn parse_patch_type(s: &str) -> Result<PatchType, String> {
    s.parse::<PatchType>().map_err(|e| e.to_string())
}

fn parse_patch_override(s: &str) -> Result<(String, PatchType), String> {
    let (name, patch_type) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TYPE, got \"{}\"", s))?;
    if name.is_empty() {
        return Err(format!("missing patch name in \"{}\"", s));
    }
    Ok((name.to_string(), parse_patch_type(patch_type)?))
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Warn
    } else {
        match verbose {
            0 => log::LevelFilter::Info,
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            verify_orientation,
            default_patch_type,
            patch_types,
            sequential,
        } => {
            let mut options = ConvertOptions::default()
                .with_verify_orientation(verify_orientation)
                .with_default_patch_type(default_patch_type)
                .with_parallel(!sequential);
            for (name, patch_type) in patch_types {
                options = options.with_patch_type(name, patch_type);
            }
            cmd_convert(&input, output, &options)?;
        }

        Commands::Info { input } => {
            cmd_info(&input)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0)); // Track highest percent seen (monotonic)

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let raw_percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        let previous = max_percent.fetch_max(raw_percent, Ordering::Relaxed);
        if raw_percent <= previous && raw_percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (raw_percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {}", bar, space, raw_percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

fn default_output(input: &Path, mesh_name: Option<String>) -> PathBuf {
    let name = mesh_name
        .or_else(|| {
            input
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "mesh".to_string());
    PathBuf::from(name).join("constant").join("polyMesh")
}

fn cmd_convert(
    input: &Path,
    output: Option<PathBuf>,
    options: &ConvertOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    let mesh = io::load(input)?;
    if mesh.num_cells() == 0 {
        log::warn!("{} has no volume cells, nothing to export", input.display());
        return Ok(());
    }

    let output = output.unwrap_or_else(|| default_output(input, mesh.name()));
    let dir = io::prepare_output_dir(&output)?;

    let mode = if options.parallel { "parallel" } else { "sequential" };
    log::info!("converting {} ({})", input.display(), mode);

    let progress = create_progress();
    let poly = algo::convert_with_progress(&mesh, options, &progress)?;
    let converted = start.elapsed();

    io::write_poly_mesh(&poly, &dir)?;

    println!("{}", poly.summary());
    for patch in &poly.patches {
        let baffle = if patch.baffle { " (baffle)" } else { "" };
        println!(
            "  {:<24} {:<10} {:>8} faces from {}{}",
            patch.name, patch.patch_type, patch.n_faces, patch.start_face, baffle
        );
    }
    for zone in &poly.cell_zones {
        println!("  cell zone {:<14} {:>8} cells", zone.name, zone.cells.len());
    }
    println!(
        "Converted in {:.2?}, wrote {} in {:.2?}",
        converted,
        dir.display(),
        start.elapsed() - converted
    );

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    let report = algo::analyze(&mesh, &ConvertOptions::default())?;

    println!("File: {}", input.display());
    println!("Nodes: {}", report.n_nodes);
    println!("Cells: {}", report.n_cells);
    println!("Face elements: {}", mesh.num_face_elements());
    println!("Free faces: {}", report.n_free_faces);
    println!(
        "Expected faces: {} ({} internal, {} boundary)",
        report.counts.total, report.counts.internal, report.counts.boundary
    );

    println!("\nPatches:");
    for (name, n_faces) in &report.patches {
        let baffle = if report.baffles.contains(name) { " (baffle)" } else { "" };
        println!("  {:<24} {:>8} faces{}", name, n_faces, baffle);
    }

    if !report.zones.is_empty() {
        println!("\nCell zones:");
        for (name, n_cells) in &report.zones {
            println!("  {:<24} {:>8} cells", name, n_cells);
        }
    }

    let groups = mesh.groups();
    let other = groups
        .iter()
        .filter(|g| !matches!(g.kind, GroupKind::Face | GroupKind::Volume))
        .count();
    if other > 0 {
        println!("\n{} node/edge groups ignored", other);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patch_override() {
        assert_eq!(
            parse_patch_override("outlet=patch").unwrap(),
            ("outlet".to_string(), PatchType::Patch)
        );
        assert!(parse_patch_override("outlet").is_err());
        assert!(parse_patch_override("=wall").is_err());
        assert!(parse_patch_override("outlet=cyclic").is_err());
    }

    #[test]
    fn test_default_output() {
        let out = default_output(Path::new("meshes/pipe.msh"), None);
        assert_eq!(out, PathBuf::from("pipe/constant/polyMesh"));
        let out = default_output(Path::new("pipe.msh"), Some("duct".to_string()));
        assert_eq!(out, PathBuf::from("duct/constant/polyMesh"));
    }

    #[test]
    fn test_empty_mesh_creates_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.msh");
        std::fs::write(
            &input,
            "$MeshFormat\n2.2 0 8\n$EndMeshFormat\n$Nodes\n0\n$EndNodes\n",
        )
        .unwrap();
        let output = dir.path().join("empty").join("constant").join("polyMesh");

        cmd_convert(&input, Some(output.clone()), &ConvertOptions::sequential()).unwrap();
        assert!(!output.exists());
        assert!(!dir.path().join("empty").exists());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "polyfoam",
            "-vv",
            "convert",
            "pipe.msh",
            "--patch-type",
            "outlet=patch",
            "--patch-type",
            "sym=symmetry",
            "--sequential",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Convert {
                patch_types,
                sequential,
                default_patch_type,
                ..
            } => {
                assert_eq!(patch_types.len(), 2);
                assert!(sequential);
                assert_eq!(default_patch_type, PatchType::Wall);
            }
            _ => panic!("expected convert"),
        }
    }
}
