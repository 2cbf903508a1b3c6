//! CLI entry-point for training and saving a model.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    config::Settings,
    nlp::ClassifierKind,
    training::{self, dataset, TrainConfig, DEFAULT_SEED},
};

/// Args for the `train` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Labelled CSV (defaults to `TRAINING_CSV`).
    #[arg(long)]
    pub csv: Option<PathBuf>,
    /// Output artifact (defaults to `MODEL_PATH`).
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Classifier families to include in the search.
    #[arg(long, value_enum, value_delimiter = ',', default_value = "logistic")]
    pub classifier: Vec<ClassifierKind>,
    /// Seed for the split, folds and solvers.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
    /// Number of cross-validation folds.
    #[arg(long, default_value_t = 5)]
    pub folds: usize,
    /// Also write the training report as JSON.
    #[arg(long)]
    pub report: Option<PathBuf>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let csv_path = args.csv.unwrap_or(settings.training_csv);
    let out_path = args.out.unwrap_or(settings.model_path);

    let records = dataset::load_csv(&csv_path)
        .with_context(|| format!("reading training data {}", csv_path.display()))?;

    let mut config = TrainConfig {
        seed: args.seed,
        folds: args.folds,
        ..TrainConfig::default()
    };
    config.grid.classifiers = args.classifier;

    let (artifact, report) = tokio::task::spawn_blocking(move || training::train(&records, &config))
        .await
        .context("training task panicked")??;

    println!("Best parameters: {}", report.best_params);
    println!(
        "Best macro-F1 (cross-validation): {:.3}",
        report.best_cv_macro_f1
    );
    println!("\nHold-out report ({} rows):", report.holdout_size);
    println!("{}", report.holdout);

    artifact
        .save(&out_path)
        .with_context(|| format!("saving model to {}", out_path.display()))?;
    info!(path = %out_path.display(), "model saved");

    if let Some(report_path) = args.report {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(&report_path, json)
            .with_context(|| format!("writing report {}", report_path.display()))?;
        info!(path = %report_path.display(), "training report written");
    }
    Ok(())
}
