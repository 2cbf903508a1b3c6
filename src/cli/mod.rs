//! Subcommands of the `insightclass` binary.

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::Settings;

pub mod predict;
pub mod serve;
pub mod train;

#[derive(Debug, Parser)]
#[command(version, about = "Sentiment classification for school feedback")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search hyperparameters on a labelled CSV and save the best model.
    Train(train::Args),
    /// Serve the JSON prediction API.
    Serve(serve::Args),
    /// Classify one feedback text with the saved model.
    Predict(predict::Args),
}

impl Command {
    pub async fn run(self, settings: Settings) -> Result<()> {
        match self {
            Self::Train(args) => train::run(args, settings).await,
            Self::Serve(args) => serve::run(args, settings).await,
            Self::Predict(args) => predict::run(args, settings).await,
        }
    }
}
