use std::path::PathBuf;

use clap::Parser;
use commands::{connect, Command, Commands, Context};
use config::{Config, OutputFormat, Overrides};
use time::UtcOffset;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

mod commands;
mod config;

/// Command-line interface for the leaderboard.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// Path to the config file.
    #[arg(long, short, env = "LEADERBOARD_CONFIG")]
    config: Option<String>,
    /// API root of the leaderboard service.
    #[arg(long)]
    api_url: Option<Url>,
    /// Output format.
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,
    /// Log more.
    #[arg(long, short)]
    verbose: bool,
    /// Command to run.
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn config_path(&self) -> eyre::Result<PathBuf> {
        match &self.config {
            Some(path) => Config::resolve_path(path),
            None => Config::default_path(),
        }
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            output: self.output,
        }
    }
}

fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> eyre::Result<()> {
    // The local offset can only be read while the process is single-threaded.
    let local_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    color_eyre::install()?;

    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli, local_offset))
}

async fn run(cli: Cli, local_offset: UtcOffset) -> eyre::Result<()> {
    let config_path = cli.config_path()?;
    let config = Config::load(&config_path, &cli.overrides())?;
    tracing::debug!(path = %config_path.display(), "config loaded");

    let client = if cli.command.is_client_required() {
        Some(connect(&config)?)
    } else {
        None
    };

    cli.command
        .execute(Context::new(
            &config_path,
            &config,
            client.as_ref(),
            local_offset,
        ))
        .await
}
