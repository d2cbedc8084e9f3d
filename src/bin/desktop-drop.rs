//! desktop-drop CLI: run drops through the ingestion pipeline from a terminal.
//!
//! Usage:
//!   desktop-drop simulate [--url U]... [--legacy P]... [--promise P]... [--config path]
//!   desktop-drop config [--config path]

use clap::{Parser, Subcommand};
use desktop_drop::{
    CopyFilePromise, DragSurface, DropConfig, DropPayload, DropResult, JsonLinesSink,
    PortableBookmarks, SurfaceGeometry,
};
use std::io::Stdout;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "desktop-drop",
    version,
    about = "Drag-and-drop ingestion pipeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Path to a YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one drop and print the channel calls as JSON lines
    Simulate {
        /// File URL to drop (file:///...)
        #[arg(long = "url")]
        urls: Vec<String>,
        /// Path to drop through the legacy filename list
        #[arg(long = "legacy")]
        legacy: Vec<String>,
        /// File to drop as a file promise (copied into a scratch directory)
        #[arg(long = "promise")]
        promises: Vec<PathBuf>,
        /// Drop location, OS coordinates
        #[arg(long, default_value_t = 0.0)]
        x: f64,
        #[arg(long, default_value_t = 0.0)]
        y: f64,
        /// Surface size; the height is used to flip the Y axis
        #[arg(long, default_value_t = 800.0)]
        width: f64,
        #[arg(long, default_value_t = 600.0)]
        height: f64,
    },
    /// Print the effective configuration
    Config,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_simulate(
    config: DropConfig,
    payload: DropPayload,
    x: f64,
    y: f64,
    geometry: SurfaceGeometry,
) -> DropResult<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    // This thread plays the UI thread: it owns the surface and its sink.
    let mut surface: DragSurface<JsonLinesSink<Stdout>> = DragSurface::attach(
        JsonLinesSink::new(std::io::stdout()),
        geometry,
        config,
        Arc::new(PortableBookmarks::new()),
        runtime.handle().clone(),
    )?;

    surface.dragging_entered(x, y);
    let ticket = surface.perform_drag_operation(&payload, x, y);
    match runtime.block_on(surface.next_completed()) {
        Some(batch) => tracing::info!(
            drop_id = %ticket.id,
            announced = batch.item_count,
            delivered = batch.items.len(),
            "simulated drop complete"
        ),
        None => tracing::warn!(drop_id = %ticket.id, "drop never completed"),
    }
    Ok(())
}

fn cmd_config(config: &DropConfig) -> DropResult<()> {
    print!("{}", config.to_yaml_string()?);
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match DropConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Simulate {
            urls,
            legacy,
            promises,
            x,
            y,
            width,
            height,
        } => {
            let mut payload = DropPayload::new();
            for url in urls {
                payload = payload.with_file_url(url);
            }
            for path in legacy {
                payload = payload.with_legacy_filename(path);
            }
            for source in promises {
                payload = payload.with_promise(Arc::new(CopyFilePromise::new(source)));
            }
            cmd_simulate(config, payload, x, y, SurfaceGeometry::new(width, height))
        }
        Commands::Config => cmd_config(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
