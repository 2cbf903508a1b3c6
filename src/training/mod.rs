//! Offline training: encode, split, cross-validated grid search, refit, evaluate.

pub mod dataset;
pub mod grid;
pub mod metrics;
pub mod split;

use indexmap::IndexMap;
use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    artifact::ModelArtifact,
    error::{Error, Result},
    nlp::{Classifier, TfidfVectorizer},
};

pub use dataset::{LabeledExample, LabeledRecord};
pub use grid::{Candidate, ParamGrid};
pub use metrics::ClassificationReport;

/// Seed shared by the hold-out split and the folds.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    pub seed: u64,
    /// Share of each class held out for the final report.
    pub test_fraction: f64,
    pub folds: usize,
    pub max_iterations: u64,
    pub grid: ParamGrid,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            test_fraction: 0.2,
            folds: 5,
            max_iterations: 1000,
            grid: ParamGrid::default(),
        }
    }
}

/// Cross-validation outcome of one grid candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: Candidate,
    /// Mean macro-F1 over folds; `None` when some fold failed to fit.
    pub mean_macro_f1: Option<f64>,
    pub std_macro_f1: Option<f64>,
    pub error: Option<String>,
}

/// Diagnostics of a training run. The hold-out section plays no part in selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Label counts in first-seen order.
    pub label_distribution: IndexMap<String, usize>,
    pub train_size: usize,
    pub holdout_size: usize,
    pub folds: usize,
    pub candidates: Vec<CandidateScore>,
    pub best_index: usize,
    pub best_params: Candidate,
    pub best_cv_macro_f1: f64,
    pub holdout: ClassificationReport,
}

/// A vectorizer and classifier fitted together on the same rows.
struct FittedPipeline {
    extractor: TfidfVectorizer,
    classifier: Classifier,
}

impl FittedPipeline {
    fn fit(candidate: &Candidate, texts: &[&str], labels: &[String]) -> Result<Self> {
        let mut extractor = TfidfVectorizer::new(candidate.tfidf);
        let features = extractor.fit_transform(texts)?;
        let classifier = candidate.classifier.fit(&features, labels)?;
        Ok(Self {
            extractor,
            classifier,
        })
    }

    fn predict(&self, texts: &[&str]) -> Result<Vec<String>> {
        let features: Array2<f64> = self.extractor.transform(texts)?;
        Ok(self.classifier.predict(&features))
    }
}

/// Encode raw records and run [`train_examples`].
pub fn train(
    records: &[LabeledRecord],
    config: &TrainConfig,
) -> Result<(ModelArtifact, TrainingReport)> {
    let examples: Vec<LabeledExample> = records.iter().map(LabeledRecord::to_example).collect();
    train_examples(&examples, config)
}

/// Select the best grid candidate by stratified k-fold macro-F1 on the training
/// split, refit it on that split and report on the untouched hold-out.
pub fn train_examples(
    examples: &[LabeledExample],
    config: &TrainConfig,
) -> Result<(ModelArtifact, TrainingReport)> {
    let mut label_distribution: IndexMap<String, usize> = IndexMap::new();
    for example in examples {
        *label_distribution.entry(example.label.clone()).or_insert(0) += 1;
    }
    info!(distribution = ?label_distribution, "label distribution");

    let labels: Vec<String> = examples.iter().map(|e| e.label.clone()).collect();
    let holdout = split::stratified_holdout(&labels, config.test_fraction, config.seed)?;
    let (train_texts, train_labels) = select(examples, &holdout.train);
    let (test_texts, test_labels) = select(examples, &holdout.evaluation);

    let folds = split::stratified_kfold(&train_labels, config.folds, config.seed)?;
    for (label, count) in count_labels(&train_labels) {
        if count < config.folds {
            warn!(%label, count, folds = config.folds, "label has fewer training rows than folds");
        }
    }

    let candidates = config.grid.candidates(config.max_iterations);
    if candidates.is_empty() {
        return Err(Error::training(
            "building the parameter grid",
            "grid has no candidates",
        ));
    }
    info!(
        candidates = candidates.len(),
        folds = folds.len(),
        fits = candidates.len() * folds.len(),
        "starting hyperparameter search"
    );

    let fold_scores: Vec<Result<f64>> = (0..candidates.len() * folds.len())
        .into_par_iter()
        .map(|job| {
            let candidate = &candidates[job / folds.len()];
            let fold = &folds[job % folds.len()];
            let fit_texts: Vec<&str> = fold.train.iter().map(|&i| train_texts[i]).collect();
            let fit_labels: Vec<String> =
                fold.train.iter().map(|&i| train_labels[i].clone()).collect();
            let eval_texts: Vec<&str> = fold.evaluation.iter().map(|&i| train_texts[i]).collect();
            let eval_labels: Vec<String> = fold
                .evaluation
                .iter()
                .map(|&i| train_labels[i].clone())
                .collect();
            let pipeline = FittedPipeline::fit(candidate, &fit_texts, &fit_labels)?;
            let predicted = pipeline.predict(&eval_texts)?;
            Ok(metrics::macro_f1(&eval_labels, &predicted))
        })
        .collect();

    let scores: Vec<CandidateScore> = candidates
        .iter()
        .zip(fold_scores.chunks(folds.len()))
        .map(|(candidate, results)| summarise(candidate, results))
        .collect();

    let mut best: Option<(usize, f64)> = None;
    for (idx, score) in scores.iter().enumerate() {
        match (score.mean_macro_f1, best) {
            (Some(mean), Some((_, top))) if mean > top => best = Some((idx, mean)),
            (Some(mean), None) => best = Some((idx, mean)),
            _ => {}
        }
    }
    let Some((best_index, best_cv_macro_f1)) = best else {
        let first_error = scores
            .iter()
            .find_map(|s| s.error.clone())
            .unwrap_or_default();
        return Err(Error::training(
            "cross-validating the parameter grid",
            format!("every candidate failed; first error: {first_error}"),
        ));
    };
    let best_params = candidates[best_index];
    info!(params = %best_params, cv_macro_f1 = best_cv_macro_f1, "selected best candidate");

    let pipeline = FittedPipeline::fit(&best_params, &train_texts, &train_labels)
        .map_err(|err| Error::training("refitting the selected candidate", err))?;
    let predicted = pipeline
        .predict(&test_texts)
        .map_err(|err| Error::training("scoring the hold-out split", err))?;
    let report = ClassificationReport::compute(&test_labels, &predicted);
    info!(
        accuracy = report.accuracy,
        macro_f1 = report.macro_avg.f1,
        "hold-out evaluation"
    );

    let artifact = ModelArtifact::new(
        pipeline.extractor,
        pipeline.classifier,
        best_params,
        best_cv_macro_f1,
    )?;
    let training_report = TrainingReport {
        label_distribution,
        train_size: holdout.train.len(),
        holdout_size: holdout.evaluation.len(),
        folds: folds.len(),
        candidates: scores,
        best_index,
        best_params,
        best_cv_macro_f1,
        holdout: report,
    };
    Ok((artifact, training_report))
}

fn select<'a>(examples: &'a [LabeledExample], indices: &[usize]) -> (Vec<&'a str>, Vec<String>) {
    indices
        .iter()
        .map(|&i| (examples[i].encoded.as_str(), examples[i].label.clone()))
        .unzip()
}

fn count_labels(labels: &[String]) -> IndexMap<&str, usize> {
    let mut counts = IndexMap::new();
    for label in labels {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }
    counts
}

fn summarise(candidate: &Candidate, results: &[Result<f64>]) -> CandidateScore {
    let mut values = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(score) => values.push(*score),
            Err(err) => {
                debug!(params = %candidate, %err, "candidate failed");
                return CandidateScore {
                    params: *candidate,
                    mean_macro_f1: None,
                    std_macro_f1: None,
                    error: Some(err.to_string()),
                };
            }
        }
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    debug!(params = %candidate, mean, std, "candidate scored");
    CandidateScore {
        params: *candidate,
        mean_macro_f1: Some(mean),
        std_macro_f1: Some(std),
        error: None,
    }
}
