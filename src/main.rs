//! Crossport CLI
//!
//! Command-line interface for relocating authored game assets into the
//! target engine's file formats.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crossport_export::{AnimGraphExporter, DiskHost, ExportOptions};
use crossport_model::{AnimationGraph, Motion};

/// Crossport - relocate authored game assets between engines
#[derive(Parser)]
#[command(name = "crossport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export an animation graph to target-engine documents
    Export(ExportArgs),

    /// Show a summary of an authored animation graph
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the authored graph JSON dump
    #[arg(short, long)]
    graph: PathBuf,

    /// Output directory for exported documents
    #[arg(short, long)]
    output: PathBuf,

    /// Source-engine path prefix to strip from asset paths
    #[arg(long, default_value = "Assets/")]
    source_prefix: String,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to the authored graph JSON dump
    #[arg(short, long)]
    graph: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Export(args) => run_export(args),
        Commands::Inspect(args) => run_inspect(args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn,crossport=info",
        1 => "info,crossport=debug",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_graph(path: &Path) -> Result<AnimationGraph> {
    crossport_model::load_graph(path)
        .with_context(|| format!("loading graph from {}", path.display()))
}

fn run_export(args: ExportArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;

    let host = DiskHost::new(ExportOptions {
        output_root: args.output.clone(),
        source_prefix: args.source_prefix,
        ..ExportOptions::default()
    });

    AnimGraphExporter::new(&host)
        .export(&graph)
        .with_context(|| format!("exporting graph '{}'", graph.name))?;

    let pending = host.drain_scheduled();
    info!(
        documents = host.writes_performed(),
        clips = pending.len(),
        "Export complete"
    );

    println!(
        "Exported '{}': {} document(s) written, {} clip(s) scheduled",
        graph.name,
        host.writes_performed(),
        pending.len()
    );
    for item in &pending {
        println!("  clip: {} ({})", item.clip.name, item.clip.key);
    }
    Ok(())
}

fn run_inspect(args: InspectArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;

    println!("Graph:  {}", graph.name);
    println!("Key:    {}", graph.key);
    println!("Source: {}", graph.source_path.as_deref().unwrap_or("<none>"));
    println!("Layers: {}", graph.layers.len());

    for (index, layer) in graph.layers.iter().enumerate() {
        let machine = &layer.state_machine;
        let transitions: usize = machine
            .states
            .iter()
            .map(|state| state.transitions.len())
            .sum();
        let max_depth = machine
            .states
            .iter()
            .filter_map(|state| state.motion.as_ref())
            .map(Motion::depth)
            .max()
            .unwrap_or(0);

        println!(
            "  [{}] {}: {} state(s), {} transition(s), {} any-state, default {}, motion depth {}",
            index,
            layer.name,
            machine.states.len(),
            transitions,
            machine.any_state_transitions.len(),
            machine.default_state.as_deref().unwrap_or("<none>"),
            max_depth
        );
    }
    Ok(())
}
