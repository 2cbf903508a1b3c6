//! Seeded stratified partitioning: one hold-out split and k cross-validation folds.

use std::collections::BTreeMap;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::error::{Error, Result};

/// Row indices of one train/evaluation partition, each sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub evaluation: Vec<usize>,
}

/// Indices per label, labels in lexical order, each group shuffled by `rng`.
fn shuffled_groups<'a>(labels: &'a [String], rng: &mut StdRng) -> BTreeMap<&'a str, Vec<usize>> {
    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, label) in labels.iter().enumerate() {
        groups.entry(label.as_str()).or_default().push(idx);
    }
    for members in groups.values_mut() {
        members.shuffle(rng);
    }
    groups
}

/// Hold out `test_fraction` of every class.
///
/// Each class keeps at least one row on both sides, so every class needs two rows.
pub fn stratified_holdout(labels: &[String], test_fraction: f64, seed: u64) -> Result<Partition> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Error::InsufficientData(format!(
            "hold-out fraction must be between 0 and 1, got {test_fraction}"
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let groups = shuffled_groups(labels, &mut rng);
    if groups.len() < 2 {
        return Err(Error::InsufficientData(format!(
            "need at least two labels to train a classifier, found {}",
            groups.len()
        )));
    }

    let mut train = Vec::new();
    let mut evaluation = Vec::new();
    for (label, members) in &groups {
        if members.len() < 2 {
            return Err(Error::InsufficientData(format!(
                "label {label:?} has {} example(s); at least 2 are needed to stratify",
                members.len()
            )));
        }
        let n_test = ((members.len() as f64 * test_fraction).round() as usize)
            .clamp(1, members.len() - 1);
        evaluation.extend_from_slice(&members[..n_test]);
        train.extend_from_slice(&members[n_test..]);
    }
    train.sort_unstable();
    evaluation.sort_unstable();
    Ok(Partition { train, evaluation })
}

/// Shuffled stratified k-fold: each fold's evaluation side takes every k-th member of each class.
///
/// The deal continues across classes so fold sizes differ by at most one.
pub fn stratified_kfold(labels: &[String], k: usize, seed: u64) -> Result<Vec<Partition>> {
    if k < 2 {
        return Err(Error::InsufficientData(format!(
            "cross-validation needs at least 2 folds, got {k}"
        )));
    }
    if labels.len() < k {
        return Err(Error::InsufficientData(format!(
            "{} training rows cannot be split into {k} folds",
            labels.len()
        )));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let groups = shuffled_groups(labels, &mut rng);

    let mut assignment = vec![0usize; labels.len()];
    let mut next_fold = 0usize;
    for members in groups.values() {
        for &idx in members {
            assignment[idx] = next_fold;
            next_fold = (next_fold + 1) % k;
        }
    }

    let folds = (0..k)
        .map(|fold| {
            let (evaluation, train): (Vec<usize>, Vec<usize>) =
                (0..labels.len()).partition(|&idx| assignment[idx] == fold);
            Partition { train, evaluation }
        })
        .collect();
    Ok(folds)
}
