//! Motorview - Interactive engine part viewer
//!
//! Loads an engine model, groups its meshes into named parts and lets the
//! user hover and click parts to inspect them.

mod app;
mod config;

use anyhow::{bail, Context, Result};
use clap::Parser;
use motorview_core::ViewerSession;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "motorview")]
#[command(about = "Explore the parts of an engine model")]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "motorview.toml")]
    config: PathBuf,

    /// glTF/GLB model to display, overrides the configured one
    #[arg(short, long)]
    model: Option<String>,

    /// Classification table mapping mesh names to part groups
    #[arg(long)]
    classification: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Write a default configuration file and exit
    #[arg(long)]
    write_default_config: bool,

    /// Validate configuration and classification, print the groups and exit
    #[arg(long)]
    check: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Motorview v{}", env!("CARGO_PKG_VERSION"));

    if args.write_default_config {
        config::save_default_config(&args.config)?;
        info!(path = %args.config.display(), "Wrote default configuration");
        return Ok(());
    }

    let mut config = config::load_config(&args.config)?;

    if let Some(model) = args.model {
        config.model.path = model;
    }
    if let Some(classification) = args.classification {
        config.model.classification = Some(classification);
    }

    let table = config.classification_table()?;
    info!(
        groups = table.groups().len(),
        meshes = table.mesh_reference_count(),
        "Classification loaded"
    );

    let session = ViewerSession::new(table, config.session.clone())
        .context("Invalid session configuration")?;

    if args.check {
        print_summary(&config, &session);
        return Ok(());
    }

    let exit = app::run(&config, session);
    if exit.is_error() {
        bail!("Viewer exited with an error: {:?}", exit);
    }
    Ok(())
}

/// Report for `--check`
fn print_summary(config: &config::Config, session: &ViewerSession) {
    let (asset_root, model_path) = config.asset_paths();
    println!("Model: {}/{}", asset_root, model_path);
    println!("Groups:");
    for group in session.table().groups() {
        println!("  {:<12} {:<16} {} meshes", group.key, group.display_name(), group.meshes.len());
    }
    let settings = session.config();
    println!(
        "Highlight: {:?} scope, hover {}, selected {}",
        settings.highlight.scope,
        settings.highlight.hover_color.to_hex_string(),
        settings.highlight.selected_color.to_hex_string()
    );
    println!("Unclassified meshes: {:?}", settings.unclassified);
}
