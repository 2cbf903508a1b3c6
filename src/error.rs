//! Error taxonomy shared by training and serving.
//!
//! Training errors are fatal for the run; serving errors are scoped to a
//! single request and never touch the loaded model.

use std::{io, path::PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause carried by [`Error::TrainingFailure`].
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    /// Training data lacks one or more required columns.
    #[error("training data is missing required columns {missing:?}; found {found:?}")]
    Schema {
        missing: Vec<String>,
        found: Vec<String>,
    },

    /// A class is too small to stratify, or the corpus cannot support the split.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// An underlying fit failed during training.
    #[error("training failed while {context}: {source}")]
    TrainingFailure {
        context: String,
        #[source]
        source: BoxedCause,
    },

    /// Document-frequency pruning removed every term.
    #[error("no terms remain after pruning (min_df={min_df}, max_df={max_df}); lower min_df or raise max_df")]
    EmptyVocabulary { min_df: String, max_df: String },

    /// Transform or predict was invoked on a component that was never fitted.
    #[error("{0} is not fitted")]
    NotFitted(&'static str),

    /// A prediction request carried a malformed record.
    #[error("invalid input{}: {reason}", item_suffix(.index))]
    PredictionInput {
        index: Option<usize>,
        reason: String,
    },

    /// The fitted pieces of an artifact disagree with each other.
    #[error("inconsistent model artifact: {0}")]
    InvalidArtifact(String),

    /// The artifact on disk was written with an incompatible layout.
    #[error("model artifact {} has schema version {found}, expected {expected}", .path.display())]
    SchemaVersion {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn item_suffix(index: &Option<usize>) -> String {
    index.map(|i| format!(" at item {i}")).unwrap_or_default()
}

impl Error {
    pub(crate) fn training<E>(context: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxedCause>,
    {
        Self::TrainingFailure {
            context: context.into(),
            source: source.into(),
        }
    }

    pub(crate) fn input(index: Option<usize>, reason: impl Into<String>) -> Self {
        Self::PredictionInput {
            index,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for errors caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::PredictionInput { .. })
    }
}
