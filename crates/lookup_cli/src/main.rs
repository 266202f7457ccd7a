//! Lookup CLI
//!
//! Drive a debounced remote selection control from the terminal.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use lookup_client::{HttpSource, Lookup};
use lookup_core::LookupConfig;

mod config;
mod input;
mod probe;
mod render;

use config::Overrides;
use render::Renderer;

#[derive(Parser)]
#[command(name = "lookup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Debounced remote selection control", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive lookup on stdin
    Run {
        #[command(flatten)]
        endpoint: EndpointArgs,

        /// Quiet period before typed text triggers a refetch
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Per-request timeout
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Fetch once and check that the endpoint serves a usable list
    Probe {
        #[command(flatten)]
        endpoint: EndpointArgs,
    },

    /// Write a default lookup.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct EndpointArgs {
    /// Candidate endpoint URL
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Configuration file (defaults to ./lookup.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let cwd = std::env::current_dir().context("Failed to read the current directory")?;

    match cli.command {
        Commands::Run {
            endpoint,
            delay_ms,
            timeout_ms,
            no_color,
        } => {
            let overrides = Overrides {
                endpoint: endpoint.endpoint,
                delay_ms,
                timeout_ms,
            };
            let config = config::load(endpoint.config.as_deref(), &cwd, overrides)?;
            cmd_run(config, no_color)
        }

        Commands::Probe { endpoint } => {
            let overrides = Overrides {
                endpoint: endpoint.endpoint,
                ..Default::default()
            };
            let config = config::load(endpoint.config.as_deref(), &cwd, overrides)?;
            cmd_probe(config)
        }

        Commands::Init { force } => cmd_init(&cwd, force),
    }
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")
}

fn cmd_run(config: LookupConfig, no_color: bool) -> Result<()> {
    info!("Looking up candidates from {}", config.endpoint_url);
    info!("Type to search; :open, :close, :select <id>, :clear, :quit");

    let source = HttpSource::from_config(&config)?;
    let lookup = Lookup::new(source, &config);

    let mut renderer = Renderer::new(&config);
    if no_color {
        renderer = renderer.plain();
    }

    let runtime = runtime()?;
    runtime.block_on(async {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        tokio::spawn(input::forward_stdin(tx));

        lookup
            .run(rx, |view| {
                let mut stdout = std::io::stdout().lock();
                let _ = stdout.write_all(renderer.render(view).as_bytes());
                let _ = stdout.flush();
            })
            .await;
    });

    // The stdin reader may still be parked in a blocking read
    runtime.shutdown_background();
    Ok(())
}

fn cmd_probe(config: LookupConfig) -> Result<()> {
    let report = runtime()?.block_on(probe::run_probe(&config));
    report.print(config.endpoint_url.trim());

    if report.failed() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_init(dir: &Path, force: bool) -> Result<()> {
    let path = config::write_default(dir, force)?;

    info!("Wrote {}", path.display());
    info!("Run `lookup probe` to check the endpoint");

    Ok(())
}
