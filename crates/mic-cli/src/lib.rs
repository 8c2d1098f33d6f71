//! micctl - operator CLI for the MIC minting ledger
//!
//! Evaluates the minting rules locally:
//! - Classify system health from a GII
//! - Calculate or estimate a learning reward under the configured policy
//! - Verify a mint receipt file
//! - Replay a scripted sequence of mints against an in-memory ledger

use clap::{Parser, Subcommand};
use mic_reward::{EnvHealthProvider, RewardEngine, StaticHealthProvider};
use std::ffi::OsString;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod output;

use commands::{health, replay, reward, verify};
pub use config::MicConfig;
pub use error::{CliError, CliResult};
use output::OutputFormat;

/// micctl application
#[derive(Parser)]
#[command(name = "micctl")]
#[command(about = "MIC minting ledger operator CLI", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MIC_CONFIG")]
    config: Option<String>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    output: OutputFormat,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Classify system health for a GII
    Health(health::HealthArgs),

    /// Calculate the reward for a completion
    Reward(reward::RewardArgs),

    /// Estimate the reward before starting a module
    Estimate(reward::EstimateArgs),

    /// Verify a receipt JSON file
    Verify(verify::VerifyArgs),

    /// Replay a JSON Lines mint script against a fresh ledger
    Replay(replay::ReplayArgs),

    /// Show effective configuration
    Config,
}

/// Reward engine over the configured policy. The GII comes from
/// `MIC_GII_OVERRIDE` when set, else from the config file.
fn build_engine(config: &MicConfig) -> CliResult<RewardEngine> {
    let fallback = Arc::new(StaticHealthProvider::new(config.health.gii));
    let provider = Arc::new(EnvHealthProvider::new(fallback));
    Ok(RewardEngine::with_policy(config.policy.clone(), provider)?)
}

/// Run using the current process arguments.
pub fn run() -> CliResult<()> {
    run_with_args(std::env::args_os())
}

/// Run using the provided argument iterator.
pub fn run_with_args<I, T>(args: I) -> CliResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let config = MicConfig::load(cli.config.as_deref())?;
    debug!(config = ?cli.config, "Configuration loaded");

    match cli.command {
        Commands::Health(args) => health::execute(args, &build_engine(&config)?, cli.output),
        Commands::Reward(args) => {
            reward::execute_reward(args, &build_engine(&config)?, cli.output)
        }
        Commands::Estimate(args) => {
            reward::execute_estimate(args, &build_engine(&config)?, cli.output)
        }
        Commands::Verify(args) => verify::execute(args, cli.output),
        Commands::Replay(args) => replay::execute(args, &config, cli.output),
        Commands::Config => match cli.output {
            OutputFormat::Json => output::print_json(&config),
            OutputFormat::Text => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
        },
    }
}
