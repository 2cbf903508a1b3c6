#![allow(dead_code)]

use insightclass::{
    nlp::{ClassifierKind, DocFrequency, FeedbackRecord, NgramRange},
    service::PredictionService,
    training::{self, LabeledRecord, ParamGrid, TrainConfig},
};

const POSITIVE: &[&str] = &["ótima", "excelente", "incrível", "maravilhosa", "clara"];
const NEGATIVE: &[&str] = &["péssima", "horrível", "confusa", "cansativa", "ruim"];
const NEUTRAL: &[&str] = &["normal", "regular", "mediana", "comum", "razoável"];

fn rows(label: &str, words: &[&str], count: usize) -> Vec<LabeledRecord> {
    (0..count)
        .map(|i| {
            let first = words[i % words.len()];
            let second = words[(i + 2) % words.len()];
            let role = if i % 3 == 0 { "professor" } else { "aluno" };
            LabeledRecord {
                record: FeedbackRecord {
                    text: format!("A aula foi {first} e o material {second}"),
                    author_role: Some(role.to_string()),
                    target_type: Some("curso".to_string()),
                    course_code: (i % 2 == 0).then(|| "MAT-101".to_string()),
                },
                label: label.to_string(),
            }
        })
        .collect()
}

/// Three cleanly separable sentiment classes, 15 rows each.
pub fn corpus() -> Vec<LabeledRecord> {
    let mut out = rows("positivo", POSITIVE, 15);
    out.extend(rows("negativo", NEGATIVE, 15));
    out.extend(rows("neutro", NEUTRAL, 15));
    out
}

/// Small grid so tests stay quick.
pub fn config(kind: ClassifierKind) -> TrainConfig {
    TrainConfig {
        grid: ParamGrid {
            classifiers: vec![kind],
            c_values: vec![1.0, 10.0],
            max_df: vec![DocFrequency::Proportion(1.0)],
            min_df: vec![DocFrequency::Count(1), DocFrequency::Count(2)],
            ngram_ranges: vec![NgramRange::UNIGRAMS, NgramRange::UNIGRAMS_BIGRAMS],
        },
        ..TrainConfig::default()
    }
}

pub fn trained_service(kind: ClassifierKind) -> PredictionService {
    let (artifact, _) = training::train(&corpus(), &config(kind)).expect("training succeeds");
    PredictionService::from_artifact(artifact)
}

pub fn feedback(text: &str) -> FeedbackRecord {
    FeedbackRecord::new(text)
}
