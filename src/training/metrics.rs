//! Precision, recall and F1 per class, plus the macro average used for model selection.

use std::{collections::BTreeSet, fmt};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class metrics over the union of true and predicted labels, in lexical order.
///
/// Ratios with a zero denominator count as 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub per_class: IndexMap<String, ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ClassificationReport {
    pub fn compute(y_true: &[String], y_pred: &[String]) -> Self {
        let labels: BTreeSet<&str> = y_true
            .iter()
            .chain(y_pred.iter())
            .map(String::as_str)
            .collect();
        let total = y_true.len();

        let mut per_class = IndexMap::new();
        for label in labels {
            let mut tp = 0;
            let mut predicted = 0;
            let mut support = 0;
            for (truth, pred) in y_true.iter().zip(y_pred) {
                let is_true = truth == label;
                let is_pred = pred == label;
                tp += usize::from(is_true && is_pred);
                predicted += usize::from(is_pred);
                support += usize::from(is_true);
            }
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = ratio(2 * tp, predicted + support);
            per_class.insert(
                label.to_string(),
                ClassMetrics {
                    precision,
                    recall,
                    f1,
                    support,
                },
            );
        }

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
        let n_classes = per_class.len().max(1) as f64;
        let mean = |pick: fn(&ClassMetrics) -> f64| {
            per_class.values().map(pick).sum::<f64>() / n_classes
        };
        let weighted = |pick: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                per_class
                    .values()
                    .map(|m| pick(m) * m.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        };
        let macro_avg = ClassMetrics {
            precision: mean(|m| m.precision),
            recall: mean(|m| m.recall),
            f1: mean(|m| m.f1),
            support: total,
        };
        let weighted_avg = ClassMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
            support: total,
        };

        Self {
            per_class,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
        }
    }
}

/// F1 averaged with equal weight per class.
pub fn macro_f1(y_true: &[String], y_pred: &[String]) -> f64 {
    ClassificationReport::compute(y_true, y_pred).macro_avg.f1
}

fn write_row(
    f: &mut fmt::Formatter<'_>,
    width: usize,
    name: &str,
    m: &ClassMetrics,
) -> fmt::Result {
    writeln!(
        f,
        "{name:>width$}  {:>9.3} {:>9.3} {:>9.3} {:>9}",
        m.precision, m.recall, m.f1, m.support
    )
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .per_class
            .keys()
            .map(|label| label.chars().count())
            .chain(std::iter::once("weighted avg".len()))
            .max()
            .unwrap_or_default();
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for (label, metrics) in &self.per_class {
            write_row(f, width, label, metrics)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>width$}  {:>9} {:>9} {:>9.3} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        write_row(f, width, "macro avg", &self.macro_avg)?;
        write_row(f, width, "weighted avg", &self.weighted_avg)
    }
}
