//! cmpdl CLI application
//!
//! Command-line interface for installing Curse modpacks: catalog lookups,
//! MD5-verified downloads and the overrides merge, with a single-line
//! progress display.

use std::process;

use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, fmt};

// Import CLI modules through the library
use cmpdl::cli::{Cli, Commands, handle_auth, handle_config, handle_inspect, handle_install};
use cmpdl::config::AppConfig;
use cmpdl::errors::Result;

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok();

    let cli = Cli::parse_args();

    // Logging needs the config's default level, so a config error is
    // reported only once logging is up
    let config = AppConfig::load(cli.global.config.clone()).await;
    let default_level = config
        .as_ref()
        .ok()
        .and_then(|c| c.logging.level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);
    init_logging(&cli, default_level);
    let config = config?;

    info!("cmpdl v{} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Install(args) => {
            info!("Executing install command");
            handle_install(args, &config, cli.global.quiet).await
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            handle_inspect(args).await
        }
        Commands::Auth(args) => {
            info!("Executing auth command");
            handle_auth(args, &config).await
        }
        Commands::Config(args) => {
            info!("Executing config command");
            handle_config(args, &config, cli.global.config).await
        }
    }
}

/// Initialize logging based on CLI verbosity settings
///
/// Logs go to stderr so they do not interleave with the progress line.
fn init_logging(cli: &Cli, default_level: Level) {
    let env_filter_set = std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();

    let mut filter = EnvFilter::from_default_env();
    if let Some(directive) = cli.log_directive(default_level, env_filter_set) {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(cli.global.very_verbose) // Show levels only in very verbose mode
        .init();

    if cli.global.very_verbose {
        info!("Very verbose logging enabled");
    } else if cli.global.verbose {
        info!("Verbose logging enabled");
    }
}
