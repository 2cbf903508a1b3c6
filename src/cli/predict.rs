//! CLI entry-point for a one-off prediction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::Settings,
    nlp::{
        context::{DEFAULT_AUTHOR_ROLE, DEFAULT_TARGET_TYPE},
        FeedbackRecord,
    },
    service::PredictionService,
};

/// Args for the `predict` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Feedback text to classify.
    #[arg(long)]
    pub text: String,
    #[arg(long, default_value = DEFAULT_AUTHOR_ROLE)]
    pub author_role: String,
    #[arg(long, default_value = DEFAULT_TARGET_TYPE)]
    pub target_type: String,
    #[arg(long)]
    pub course_code: Option<String>,
    /// Model artifact to load instead of `MODEL_PATH`.
    #[arg(long)]
    pub model: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let model_path = args.model.unwrap_or(settings.model_path);
    let service = PredictionService::load(&model_path)
        .with_context(|| format!("could not load model at {}", model_path.display()))?;
    let record = FeedbackRecord {
        text: args.text,
        author_role: Some(args.author_role),
        target_type: Some(args.target_type),
        course_code: args.course_code,
    };
    let result = service.predict_one(&record)?;
    println!("{}", serde_json::to_string(&result)?);
    Ok(())
}
