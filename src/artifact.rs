//! Persisted model: fitted vectorizer, fitted classifier and how they were chosen.

use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::{Error, Result},
    nlp::{Capability, Classifier, TfidfVectorizer},
    training::grid::Candidate,
};

/// Layout version written into every artifact; loading any other version fails.
pub const ARTIFACT_SCHEMA_VERSION: u32 = 1;

/// Immutable once built. Training hands it to [`ModelArtifact::save`]; serving
/// obtains it from [`ModelArtifact::load`] and keeps it for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    schema_version: u32,
    created_at: DateTime<Utc>,
    params: Candidate,
    cv_macro_f1: f64,
    extractor: TfidfVectorizer,
    classifier: Classifier,
}

impl ModelArtifact {
    /// Bundle a fitted pipeline; the pair must agree on feature width and class count.
    pub fn new(
        extractor: TfidfVectorizer,
        classifier: Classifier,
        params: Candidate,
        cv_macro_f1: f64,
    ) -> Result<Self> {
        let artifact = Self {
            schema_version: ARTIFACT_SCHEMA_VERSION,
            created_at: Utc::now(),
            params,
            cv_macro_f1,
            extractor,
            classifier,
        };
        artifact.validate()?;
        Ok(artifact)
    }

    fn validate(&self) -> Result<()> {
        self.extractor.check_consistency()?;
        self.classifier.check_consistency()?;
        if self.extractor.vocabulary_size() != self.classifier.n_features() {
            return Err(Error::InvalidArtifact(format!(
                "extractor yields {} features but classifier expects {}",
                self.extractor.vocabulary_size(),
                self.classifier.n_features()
            )));
        }
        Ok(())
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn params(&self) -> &Candidate {
        &self.params
    }

    pub fn cv_macro_f1(&self) -> f64 {
        self.cv_macro_f1
    }

    pub fn capability(&self) -> Capability {
        self.classifier.capability()
    }

    pub fn labels(&self) -> &[String] {
        self.classifier.classes()
    }

    pub fn extractor(&self) -> &TfidfVectorizer {
        &self.extractor
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Write as JSON, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }
        let file = File::create(path).map_err(|err| Error::io(path, err))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush().map_err(|err| Error::io(path, err))?;
        info!(
            path = %path.display(),
            capability = %self.capability(),
            features = self.extractor.vocabulary_size(),
            "saved model artifact"
        );
        Ok(())
    }

    /// Read and check an artifact written by [`ModelArtifact::save`].
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|err| Error::io(path, err))?;
        // Version is checked before the body so older layouts fail with a clear error.
        let raw: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
        let found = raw
            .get("schema_version")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or_default() as u32;
        if found != ARTIFACT_SCHEMA_VERSION {
            return Err(Error::SchemaVersion {
                path: path.to_path_buf(),
                expected: ARTIFACT_SCHEMA_VERSION,
                found,
            });
        }
        let artifact: Self = serde_json::from_value(raw)?;
        artifact.validate()?;
        info!(
            path = %path.display(),
            capability = %artifact.capability(),
            schema_version = artifact.schema_version,
            labels = ?artifact.labels(),
            "loaded model artifact"
        );
        Ok(artifact)
    }
}
