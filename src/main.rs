//! transcript-chat - terminal entry point
//!
//! Loads configuration from the environment, layers the command-line flags on top
//! and hands over to the selected command.

use anyhow::Context;
use clap::Parser;

use transcript_chat::cli::Cli;
use transcript_chat::cli::commands::run_cli;
use transcript_chat::config::AppConfig;
use transcript_chat::shared::logging::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = AppConfig::from_env();
    run_cli(cli, config).await.context("transcript-chat failed")?;
    Ok(())
}
