//! shopcheck CLI - Main Entry Point
//!
//! Runs shopping-flow scenarios against a storefront and exposes the
//! individual page reads for ad-hoc checks.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use shopcheck_cli::client::StorefrontClient;
use shopcheck_cli::commands::{config, inspect, price, run, store};
use shopcheck_cli::output::OutputFormat;
use shopcheck_cli::settings::{self, Overrides};
use shopcheck_e2e::Browser;

/// shopcheck - end-to-end shopping-flow checks
#[derive(Parser)]
#[command(name = "shopcheck")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Storefront base URL
    #[arg(long, env = "SHOPCHECK_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Configuration file
    #[arg(long, env = "SHOPCHECK_CONFIG", default_value = "shopcheck.toml", global = true)]
    config: PathBuf,

    /// Per-operation timeout in milliseconds
    #[arg(long, env = "SHOPCHECK_TIMEOUT_MS", global = true)]
    timeout_ms: Option<u64>,

    /// Retries of the order-total search
    #[arg(long, env = "SHOPCHECK_RETRIES", global = true)]
    retries: Option<u32>,

    /// Scenarios run concurrently
    #[arg(long, env = "SHOPCHECK_PARALLELISM", global = true)]
    parallelism: Option<usize>,

    /// Pause between polling attempts in milliseconds
    #[arg(long, env = "SHOPCHECK_POLL_INTERVAL_MS", global = true)]
    poll_interval_ms: Option<u64>,

    /// Browser engine (chromium, firefox, webkit)
    #[arg(long, env = "SHOPCHECK_BROWSER", default_value = "chromium", global = true)]
    browser: String,

    /// Show the browser window
    #[arg(long, global = true)]
    headed: bool,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run YAML scenarios, each in its own browser session
    Run(run::RunArgs),

    /// Read or act on the live storefront
    #[command(subcommand)]
    Store(store::StoreCommands),

    /// Read state from a saved HTML page
    Inspect(inspect::InspectArgs),

    /// Parse a rendered price
    Price(price::PriceArgs),

    /// Show or create the configuration file
    #[command(subcommand)]
    Config(config::ConfigCommands),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let overrides = Overrides {
        base_url: cli.base_url.clone(),
        timeout_ms: cli.timeout_ms,
        retries: cli.retries,
        parallelism: cli.parallelism,
        poll_interval_ms: cli.poll_interval_ms,
    };
    let run_config = settings::resolve(&cli.config, &overrides)?;
    let browser: Browser = cli.browser.parse()?;
    let client = StorefrontClient::new(
        run_config.clone(),
        settings::playwright_config(&run_config, browser, cli.headed),
    );

    match cli.command {
        Commands::Run(args) => {
            if !run::execute(args, client, cli.format).await? {
                std::process::exit(1);
            }
        }
        Commands::Store(cmd) => store::execute(cmd, client, cli.format).await?,
        Commands::Inspect(args) => inspect::execute(args, cli.format).await?,
        Commands::Price(args) => price::execute(args, cli.format)?,
        Commands::Config(cmd) => config::execute(cmd, &run_config, cli.format)?,
        Commands::Version => {
            println!("shopcheck v{}", env!("CARGO_PKG_VERSION"));
            println!("Storefront markups: classic, blocks");
        }
    }

    Ok(())
}
