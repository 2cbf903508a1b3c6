//! TF-IDF bag-of-n-grams over encoded feedback strings.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    fmt,
};

use ndarray::Array2;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Word tokens of two or more characters; tag brackets and `=` act as separators.
static TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// Inclusive range of n-gram lengths to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NgramRange {
    pub min_n: usize,
    pub max_n: usize,
}

impl NgramRange {
    pub const UNIGRAMS: Self = Self { min_n: 1, max_n: 1 };
    pub const UNIGRAMS_BIGRAMS: Self = Self { min_n: 1, max_n: 2 };
}

impl Default for NgramRange {
    fn default() -> Self {
        Self::UNIGRAMS
    }
}

impl fmt::Display for NgramRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.min_n, self.max_n)
    }
}

/// Document-frequency bound, either an absolute document count or a share of the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocFrequency {
    Count(usize),
    Proportion(f64),
}

impl DocFrequency {
    fn documents(&self, n_documents: usize) -> f64 {
        match *self {
            Self::Count(count) => count as f64,
            Self::Proportion(share) => share * n_documents as f64,
        }
    }
}

impl fmt::Display for DocFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Count(count) => write!(f, "{count}"),
            Self::Proportion(share) => write!(f, "{share:?}"),
        }
    }
}

/// Vectorizer knobs searched by the training grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfidfConfig {
    pub ngram_range: NgramRange,
    /// Terms seen in fewer documents than this are dropped.
    pub min_df: DocFrequency,
    /// Terms seen in more documents than this are dropped.
    pub max_df: DocFrequency,
    pub lowercase: bool,
}

impl Default for TfidfConfig {
    fn default() -> Self {
        Self {
            ngram_range: NgramRange::UNIGRAMS,
            min_df: DocFrequency::Count(1),
            max_df: DocFrequency::Proportion(1.0),
            lowercase: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TfidfState {
    /// Term to column index; columns follow the lexical order of the terms.
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    n_documents: usize,
}

/// TF-IDF vectorizer with a vocabulary frozen at fit time.
///
/// Rows produced by [`TfidfVectorizer::transform`] are raw term counts scaled by
/// smoothed IDF (`ln((1 + n) / (1 + df)) + 1`) and L2-normalised. Terms absent
/// from the fitted vocabulary contribute nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    config: TfidfConfig,
    state: Option<TfidfState>,
}

impl TfidfVectorizer {
    pub fn new(config: TfidfConfig) -> Self {
        Self {
            config,
            state: None,
        }
    }

    pub fn config(&self) -> &TfidfConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    /// Number of learned feature columns; zero before fitting.
    pub fn vocabulary_size(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.vocabulary.len())
    }

    /// Learned terms in column order.
    pub fn vocabulary(&self) -> Vec<&str> {
        self.state
            .as_ref()
            .map(|s| s.vocabulary.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Fitted state must carry one IDF weight per term, and the term columns
    /// must cover `0..len` exactly once.
    pub(crate) fn check_consistency(&self) -> Result<()> {
        let state = self
            .state
            .as_ref()
            .ok_or(Error::NotFitted("feature extractor"))?;
        let width = state.vocabulary.len();
        if state.idf.len() != width {
            return Err(Error::InvalidArtifact(format!(
                "{} idf weights for {width} vocabulary terms",
                state.idf.len()
            )));
        }
        let mut seen = vec![false; width];
        for (term, &col) in &state.vocabulary {
            match seen.get_mut(col) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(Error::InvalidArtifact(format!(
                        "term {term:?} maps to column {col} of {width}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// Learn vocabulary and IDF weights, replacing any previous fit.
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<()> {
        let n_documents = documents.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let unique: HashSet<String> = self.analyze(doc.as_ref()).into_iter().collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let min_docs = self.config.min_df.documents(n_documents);
        let max_docs = self.config.max_df.documents(n_documents);
        let kept: BTreeMap<String, usize> = document_frequency
            .into_iter()
            .filter(|(_, df)| {
                let df = *df as f64;
                df >= min_docs && df <= max_docs
            })
            .collect();
        if kept.is_empty() {
            return Err(Error::EmptyVocabulary {
                min_df: self.config.min_df.to_string(),
                max_df: self.config.max_df.to_string(),
            });
        }

        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(kept.len());
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            idf.push(((1.0 + n_documents as f64) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, idx);
        }
        debug!(
            documents = n_documents,
            terms = vocabulary.len(),
            "fitted tfidf vocabulary"
        );
        self.state = Some(TfidfState {
            vocabulary,
            idf,
            n_documents,
        });
        Ok(())
    }

    /// Map documents to a dense `(documents, vocabulary)` matrix.
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Result<Array2<f64>> {
        let state = self
            .state
            .as_ref()
            .ok_or(Error::NotFitted("feature extractor"))?;
        let mut matrix = Array2::<f64>::zeros((documents.len(), state.vocabulary.len()));
        for (row_idx, doc) in documents.iter().enumerate() {
            let mut row = matrix.row_mut(row_idx);
            for term in self.analyze(doc.as_ref()) {
                if let Some(&col) = state.vocabulary.get(&term) {
                    row[col] += 1.0;
                }
            }
            for (col, value) in row.iter_mut().enumerate() {
                *value *= state.idf[col];
            }
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }
        Ok(matrix)
    }

    pub fn fit_transform<S: AsRef<str>>(&mut self, documents: &[S]) -> Result<Array2<f64>> {
        self.fit(documents)?;
        self.transform(documents)
    }

    /// Tokenise and expand into the configured n-grams.
    fn analyze(&self, document: &str) -> Vec<String> {
        let lowered;
        let text = if self.config.lowercase {
            lowered = document.to_lowercase();
            lowered.as_str()
        } else {
            document
        };
        let tokens: Vec<&str> = TOKEN.find_iter(text).map(|m| m.as_str()).collect();
        let NgramRange { min_n, max_n } = self.config.ngram_range;
        let mut terms = Vec::new();
        for n in min_n.max(1)..=max_n {
            if n == 1 {
                terms.extend(tokens.iter().map(|t| t.to_string()));
            } else {
                terms.extend(tokens.windows(n).map(|w| w.join(" ")));
            }
        }
        terms
    }
}
