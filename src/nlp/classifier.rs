//! Linear sentiment classifiers and their scoring capability.

use std::{collections::BTreeSet, fmt};

use linfa::{dataset::DatasetBase, prelude::Fit};
use linfa_logistic::MultiLogisticRegression;
use linfa_svm::Svm;
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Which linear model family to fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ClassifierKind {
    /// Multinomial logistic regression; exposes class probabilities.
    Logistic,
    /// One-vs-rest linear SVM; label only.
    LinearSvm,
}

impl ClassifierKind {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Logistic => Capability::Scored,
            Self::LinearSvm => Capability::Unscored,
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logistic => f.write_str("logistic"),
            Self::LinearSvm => f.write_str("linear-svm"),
        }
    }
}

/// Whether a fitted classifier can report per-class probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Scored,
    Unscored,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scored => f.write_str("scored"),
            Self::Unscored => f.write_str("unscored"),
        }
    }
}

/// Hyperparameters for one classifier fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierParams {
    pub kind: ClassifierKind,
    /// Inverse regularisation strength; larger values fit the training data harder.
    pub c: f64,
    /// Iteration cap for the logistic solver.
    pub max_iterations: u64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            kind: ClassifierKind::Logistic,
            c: 1.0,
            max_iterations: 1000,
        }
    }
}

impl ClassifierParams {
    /// Fit on a `(samples, features)` matrix; the label set is whatever `labels` contains.
    pub fn fit(&self, features: &Array2<f64>, labels: &[String]) -> Result<Classifier> {
        if features.nrows() != labels.len() {
            return Err(Error::training(
                "aligning features with labels",
                format!("{} rows but {} labels", features.nrows(), labels.len()),
            ));
        }
        if !(self.c.is_finite() && self.c > 0.0) {
            return Err(Error::training(
                "validating classifier params",
                format!("C must be positive and finite, got {}", self.c),
            ));
        }
        let distinct: BTreeSet<&String> = labels.iter().collect();
        if distinct.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "need at least two distinct labels to fit a classifier, found {}",
                distinct.len()
            )));
        }

        match self.kind {
            ClassifierKind::Logistic => self.fit_logistic(features, labels).map(Classifier::Scored),
            ClassifierKind::LinearSvm => self.fit_svm(features, labels).map(Classifier::Unscored),
        }
    }

    fn fit_logistic(&self, features: &Array2<f64>, labels: &[String]) -> Result<LinearModel> {
        let dataset = DatasetBase::new(features.clone(), Array1::from(labels.to_vec()));
        let fitted = MultiLogisticRegression::default()
            .alpha(1.0 / self.c)
            .max_iterations(self.max_iterations)
            .fit(&dataset)
            .map_err(|err| Error::training("fitting logistic regression", err.to_string()))?;
        debug!(
            classes = fitted.classes().len(),
            c = self.c,
            "fitted logistic regression"
        );
        Ok(LinearModel {
            classes: fitted.classes().to_vec(),
            weights: fitted.params().clone(),
            intercept: fitted.intercept().clone(),
        })
    }

    /// One linear-kernel SVM per class against the rest.
    fn fit_svm(&self, features: &Array2<f64>, labels: &[String]) -> Result<LinearModel> {
        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut weights = Array2::<f64>::zeros((features.ncols(), classes.len()));
        let mut intercept = Array1::<f64>::zeros(classes.len());
        for (class_idx, class) in classes.iter().enumerate() {
            let targets: Array1<bool> = labels.iter().map(|label| label == class).collect();
            let dataset = DatasetBase::new(features.clone(), targets);
            let svm = Svm::<f64, bool>::params()
                .pos_neg_weights(self.c, self.c)
                .linear_kernel()
                .fit(&dataset)
                .map_err(|err| {
                    Error::training(format!("fitting linear svm for {class:?}"), err.to_string())
                })?;
            if svm.alpha.len() != features.nrows() {
                return Err(Error::training(
                    format!("fitting linear svm for {class:?}"),
                    format!(
                        "{} dual weights for {} training rows",
                        svm.alpha.len(),
                        features.nrows()
                    ),
                ));
            }
            // Linear kernel: sum_i alpha_i <x_i, x> - rho == <w, x> - rho.
            let dual = Array1::from(svm.alpha.clone());
            weights.column_mut(class_idx).assign(&features.t().dot(&dual));
            intercept[class_idx] = -svm.rho;
        }
        debug!(classes = classes.len(), c = self.c, "fitted linear svm");
        Ok(LinearModel {
            classes,
            weights,
            intercept,
        })
    }
}

/// Weights of a fitted linear model, one column per class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    classes: Vec<String>,
    /// `(features, classes)`.
    weights: Array2<f64>,
    intercept: Array1<f64>,
}

impl LinearModel {
    /// Shapes that a deserialized model must agree on before it can score rows.
    fn check_consistency(&self) -> Result<()> {
        let n_classes = self.classes.len();
        if n_classes < 2 {
            return Err(Error::InvalidArtifact(format!(
                "classifier has {n_classes} classes, need at least two"
            )));
        }
        if self.classes.iter().collect::<BTreeSet<_>>().len() != n_classes {
            return Err(Error::InvalidArtifact(
                "classifier lists a class more than once".to_string(),
            ));
        }
        if self.weights.ncols() != n_classes || self.intercept.len() != n_classes {
            return Err(Error::InvalidArtifact(format!(
                "{n_classes} classes but {} weight columns and {} intercepts",
                self.weights.ncols(),
                self.intercept.len()
            )));
        }
        Ok(())
    }

    /// Scored row by row, so a row gets the same bits alone or inside a batch.
    fn decision(&self, features: &Array2<f64>) -> Array2<f64> {
        let mut scores = Array2::<f64>::zeros((features.nrows(), self.classes.len()));
        for (mut out, row) in scores.rows_mut().into_iter().zip(features.rows()) {
            out.assign(&(row.dot(&self.weights) + &self.intercept));
        }
        scores
    }

    fn argmax_labels(&self, scores: &Array2<f64>) -> Vec<String> {
        scores
            .axis_iter(Axis(0))
            .map(|row| {
                let mut best = 0;
                for (idx, value) in row.iter().enumerate() {
                    if *value > row[best] {
                        best = idx;
                    }
                }
                self.classes[best].clone()
            })
            .collect()
    }
}

/// A fitted classifier tagged with its scoring capability.
///
/// The tag is fixed when the model is fitted and travels with the artifact, so
/// callers branch on [`Classifier::capability`] instead of probing the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "capability", content = "model", rename_all = "snake_case")]
pub enum Classifier {
    Scored(LinearModel),
    Unscored(LinearModel),
}

impl Classifier {
    pub fn capability(&self) -> Capability {
        match self {
            Self::Scored(_) => Capability::Scored,
            Self::Unscored(_) => Capability::Unscored,
        }
    }

    fn model(&self) -> &LinearModel {
        match self {
            Self::Scored(model) | Self::Unscored(model) => model,
        }
    }

    pub(crate) fn check_consistency(&self) -> Result<()> {
        self.model().check_consistency()
    }

    /// Label space learned from training data, in column order.
    pub fn classes(&self) -> &[String] {
        &self.model().classes
    }

    /// Width of the feature rows the model expects.
    pub fn n_features(&self) -> usize {
        self.model().weights.nrows()
    }

    /// Highest-scoring label per row; ties go to the earlier class.
    pub fn predict(&self, features: &Array2<f64>) -> Vec<String> {
        let model = self.model();
        model.argmax_labels(&model.decision(features))
    }

    /// Per-class probabilities (softmax over the decision scores), `None` when unscored.
    pub fn predict_proba(&self, features: &Array2<f64>) -> Option<Array2<f64>> {
        let Self::Scored(model) = self else {
            return None;
        };
        let mut scores = model.decision(features);
        for mut row in scores.axis_iter_mut(Axis(0)) {
            let max = row.fold(f64::NEG_INFINITY, |acc, v| acc.max(*v));
            row.mapv_inplace(|v| (v - max).exp());
            let total = row.sum();
            row.mapv_inplace(|v| v / total);
        }
        Some(scores)
    }
}
