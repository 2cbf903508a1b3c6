//! Hyperparameter grid for the cross-validated search.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::nlp::{ClassifierKind, ClassifierParams, DocFrequency, NgramRange, TfidfConfig};

/// Values to try for each searched knob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub classifiers: Vec<ClassifierKind>,
    pub c_values: Vec<f64>,
    pub max_df: Vec<DocFrequency>,
    pub min_df: Vec<DocFrequency>,
    pub ngram_ranges: Vec<NgramRange>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            classifiers: vec![ClassifierKind::Logistic],
            c_values: vec![0.1, 1.0, 10.0],
            max_df: vec![DocFrequency::Proportion(1.0)],
            min_df: vec![
                DocFrequency::Count(2),
                DocFrequency::Count(3),
                DocFrequency::Count(5),
            ],
            ngram_ranges: vec![NgramRange::UNIGRAMS, NgramRange::UNIGRAMS_BIGRAMS],
        }
    }
}

/// One point of the grid: a full vectorizer + classifier configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub tfidf: TfidfConfig,
    pub classifier: ClassifierParams,
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "classifier={} C={} max_df={} min_df={} ngram_range={}",
            self.classifier.kind,
            self.classifier.c,
            self.tfidf.max_df,
            self.tfidf.min_df,
            self.tfidf.ngram_range
        )
    }
}

impl ParamGrid {
    pub fn len(&self) -> usize {
        self.classifiers.len()
            * self.c_values.len()
            * self.max_df.len()
            * self.min_df.len()
            * self.ngram_ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination, knobs in name order with `ngram_range` varying fastest.
    ///
    /// The search breaks score ties in favour of the earliest candidate here.
    pub fn candidates(&self, max_iterations: u64) -> Vec<Candidate> {
        let mut out = Vec::with_capacity(self.len());
        for &kind in &self.classifiers {
            for &c in &self.c_values {
                for &max_df in &self.max_df {
                    for &min_df in &self.min_df {
                        for &ngram_range in &self.ngram_ranges {
                            out.push(Candidate {
                                tfidf: TfidfConfig {
                                    ngram_range,
                                    min_df,
                                    max_df,
                                    lowercase: true,
                                },
                                classifier: ClassifierParams {
                                    kind,
                                    c,
                                    max_iterations,
                                },
                            });
                        }
                    }
                }
            }
        }
        out
    }
}
