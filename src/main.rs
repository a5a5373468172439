use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use issuebot::config::LoggingConfig;
use issuebot::health::CheckResult;
use issuebot::{Config, Daemon, HealthCheck};

#[derive(Parser)]
#[command(name = "issuebot")]
#[command(about = "Polling GitHub issue bot that triages issues and chases reporter feedback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Monitor the configured repositories
    Run {
        /// Run a single tick and exit
        #[arg(long)]
        once: bool,
    },

    /// Verify configuration, credentials and repository access
    Check,

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        config_command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration with the password masked
    Show,

    /// Print the configuration file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Config {
        config_command: ConfigCommands::Path,
    } = &cli.command
    {
        return cmd_config_path(cli.config);
    }

    let config = load_config(cli.config)?;
    init_logging(cli.verbose, &config.logging)?;
    info!("Starting issuebot v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run { once } => cmd_run(once, &config).await,
        Commands::Check => cmd_check(&config).await,
        Commands::Config { .. } => cmd_config_show(&config),
    }
}

/// Initialize logging based on verbosity level and configured format
///
/// Logs go to stderr so command output on stdout stays machine readable.
fn init_logging(verbose: bool, logging: &LoggingConfig) -> Result<()> {
    let default_level = if verbose { "debug" } else { logging.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json = logging.format == "json";
    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().compact().with_writer(std::io::stderr)))
        .with(filter)
        .init();

    Ok(())
}

/// Load configuration from specified path or default location
fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    match config_path {
        Some(path) => Config::load(&path),
        None => Config::load_or_default(),
    }
}

async fn cmd_run(once: bool, config: &Config) -> Result<()> {
    config.validate()?;
    let daemon = Daemon::new(config)?;

    if once {
        let summary = daemon.run_once().await;
        if !summary.is_clean() {
            bail!("{} repository handlers failed", summary.handler_failures);
        }
        return Ok(());
    }

    daemon.run().await
}

async fn cmd_check(config: &Config) -> Result<()> {
    let health = HealthCheck::run(config).await;
    print_health_report(&health);
    if !health.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn cmd_config_show(config: &Config) -> Result<()> {
    print!("{}", serde_yaml::to_string(&config.redacted())?);
    Ok(())
}

fn cmd_config_path(config_path: Option<std::path::PathBuf>) -> Result<()> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_config_path()?,
    };
    println!("{}", path.display());
    Ok(())
}

/// Print health check report to stdout
fn print_health_report(health: &HealthCheck) {
    fn print_check(name: &str, result: &CheckResult) {
        println!("{}:", name);
        let icon = if result.passed {
            if result.is_warning { "⚠️ " } else { "✅" }
        } else {
            "❌"
        };
        println!("  {} {}", icon, result.message);
        if let Some(details) = &result.details {
            for line in details.lines() {
                println!("     {}", line);
            }
        }
    }

    println!("🔍 issuebot Diagnostics");
    println!();

    for (name, result) in health.all_checks() {
        print_check(name, result);
        println!();
    }

    if health.all_passed() {
        println!("✅ All checks passed");
    } else {
        println!("❌ Some checks failed");
    }
}
