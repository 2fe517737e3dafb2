use anyhow::Result;
use clap::Parser;
use nbu_pnl::cli::{runner, Cli};
use nbu_pnl::config::Config;
use nbu_pnl::dispatcher;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    debug!("Effective config: {:?}", config);

    let today = chrono::Local::now().date_naive();
    let command = runner::to_internal_command(&cli.command, today)?;

    dispatcher::dispatch_command(command, &config, cli.json).await
}
