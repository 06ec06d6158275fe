//! guideshot CLI
//!
//! One-shot content-generation utility: run one batch by name, or the
//! whole catalogue with `--all`.

use anyhow::Context;
use clap::Parser;
use guideshot::error::{CatalogueError, Error};
use guideshot::runner::{self, Mode};
use guideshot::{catalogue, Config};

/// Documentation screenshot capture pipeline
#[derive(Parser, Debug)]
#[command(name = "guideshot")]
#[command(version)]
#[command(about = "Capture PII-masked documentation screenshots of a running web application")]
struct Args {
    /// Name of the batch to run
    batch: Option<String>,

    /// Run all batches, one isolated session per batch
    #[arg(long)]
    all: bool,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Base URL of the target application (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Output directory for PNG artifacts (overrides config)
    #[arg(long)]
    output_dir: Option<String>,

    /// Path to a Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<String>,

    /// Run with a visible browser window
    #[arg(long)]
    headed: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path).with_context(|| format!("loading config {path}"))?,
        None => Config::default(),
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(output_dir) = args.output_dir {
        config.output_dir = output_dir.into();
    }
    if let Some(chrome_path) = args.chrome_path {
        config.chrome_path = Some(chrome_path);
    }
    if args.headed {
        config.headless = false;
    }

    let mode = match (args.batch, args.all) {
        (_, true) => Mode::All,
        (Some(name), false) => Mode::Single(name),
        (None, false) => Mode::Usage,
    };

    match runner::run(&config, mode).await {
        Ok(()) => Ok(()),
        Err(Error::Catalogue(CatalogueError::UnknownBatch(name))) => {
            eprintln!("Unknown batch: {name}");
            let names: Vec<String> = catalogue::standard_catalogue()
                .iter()
                .map(|b| b.name.clone())
                .collect();
            eprintln!("Available: {}", names.join(", "));
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
