//! Prediction over a single loaded model artifact.

use std::{path::Path, slice, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    artifact::ModelArtifact,
    error::{Error, Result},
    nlp::{clean_text, Capability, FeedbackRecord},
};

/// Shortest accepted feedback, counted in characters after trimming.
pub const MIN_TEXT_CHARS: usize = 3;

/// Label for one record; `confidence` is set only when the model is scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    pub confidence: Option<f64>,
}

/// Read-only handle over one [`ModelArtifact`].
///
/// Cloning shares the same artifact; nothing here mutates it, so any number of
/// threads may predict concurrently.
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifact: Arc<ModelArtifact>,
}

impl PredictionService {
    /// Load the artifact at `path`; callers treat failure as fatal.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::from_artifact(ModelArtifact::load(path)?))
    }

    pub fn from_artifact(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn capability(&self) -> Capability {
        self.artifact.capability()
    }

    pub fn predict_one(&self, record: &FeedbackRecord) -> Result<PredictionResult> {
        validate(record).map_err(|reason| Error::input(None, reason))?;
        let mut results = self.predict_valid(slice::from_ref(record))?;
        results
            .pop()
            .ok_or_else(|| Error::input(None, "model returned no prediction"))
    }

    /// One result per record, in input order. A single invalid record fails the whole call.
    pub fn predict_batch(&self, records: &[FeedbackRecord]) -> Result<Vec<PredictionResult>> {
        for (index, record) in records.iter().enumerate() {
            validate(record).map_err(|reason| Error::input(Some(index), reason))?;
        }
        if records.is_empty() {
            return Ok(Vec::new());
        }
        self.predict_valid(records)
    }

    /// Encode, vectorise and classify all rows in one pass.
    fn predict_valid(&self, records: &[FeedbackRecord]) -> Result<Vec<PredictionResult>> {
        let encoded: Vec<String> = records.iter().map(FeedbackRecord::encode).collect();
        let features = self.artifact.extractor().transform(&encoded)?;
        let classifier = self.artifact.classifier();
        let labels = classifier.predict(&features);
        let confidences: Vec<Option<f64>> = match classifier.predict_proba(&features) {
            Some(probabilities) => probabilities
                .rows()
                .into_iter()
                .map(|row| Some(row.fold(0.0_f64, |acc, p| acc.max(*p))))
                .collect(),
            None => vec![None; labels.len()],
        };
        debug!(rows = labels.len(), capability = %classifier.capability(), "predicted batch");
        Ok(labels
            .into_iter()
            .zip(confidences)
            .map(|(label, confidence)| PredictionResult { label, confidence })
            .collect())
    }
}

fn validate(record: &FeedbackRecord) -> std::result::Result<(), String> {
    let trimmed = record.text.trim();
    if trimmed.chars().count() < MIN_TEXT_CHARS {
        return Err(format!(
            "text must have at least {MIN_TEXT_CHARS} characters after trimming"
        ));
    }
    if clean_text(Some(trimmed)).is_empty() {
        return Err("text is empty once markup is removed".to_string());
    }
    Ok(())
}
