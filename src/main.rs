//! `insightclass` binary: train, serve or query the sentiment model.

use anyhow::Result;
use clap::Parser;
use insightclass::{cli::Cli, config::Settings, logging};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing()?;
    let settings = Settings::load()?;
    debug!(?settings, "resolved settings");
    cli.command.run(settings).await
}
