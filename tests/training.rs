mod common;

use insightclass::{
    nlp::{ClassifierKind, DocFrequency, FeedbackRecord},
    training::{self, dataset, split, LabeledRecord, ParamGrid, TrainConfig},
    Error,
};

const CSV: &str = "texto,label,author_role,target_type,course_code
Aula ótima,positivo,aluno,professor,MAT-101
Aula <b>ruim</b>,negativo,Aluno,PROFESSOR,
,neutro,professor,curso,
Sem rótulo,,aluno,professor,
";

#[test]
fn csv_rows_become_labeled_records() {
    let records = dataset::read_csv(CSV.as_bytes()).unwrap();
    assert_eq!(records.len(), 3, "unlabelled row is skipped");
    assert_eq!(records[0].label, "positivo");
    assert_eq!(records[0].record.course_code.as_deref(), Some("MAT-101"));
    assert_eq!(records[1].record.course_code, None);
    assert_eq!(
        records[1].to_example().encoded,
        "[ROLE=aluno] [TARGET=professor] Aula ruim"
    );
    assert_eq!(
        records[2].to_example().encoded,
        "[ROLE=professor] [TARGET=curso]"
    );
}

#[test]
fn missing_label_column_is_a_schema_error() {
    let csv = "texto,author_role,target_type\nAula boa,aluno,professor\n";
    match dataset::read_csv(csv.as_bytes()) {
        Err(Error::Schema { missing, found }) => {
            assert_eq!(missing, vec!["label"]);
            assert_eq!(found, vec!["texto", "author_role", "target_type"]);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn course_code_column_is_optional() {
    let csv = "label,texto,target_type,author_role\nnegativo,Chato,turma,coordenador\n";
    let records = dataset::read_csv(csv.as_bytes()).unwrap();
    assert_eq!(
        records[0].record,
        FeedbackRecord {
            text: "Chato".to_string(),
            author_role: Some("coordenador".to_string()),
            target_type: Some("turma".to_string()),
            course_code: None,
        }
    );
}

#[test]
fn holdout_split_is_stratified_and_seeded() {
    let labels: Vec<String> = (0..30)
        .map(|i| if i % 3 == 0 { "neg" } else { "pos" }.to_string())
        .collect();
    let first = split::stratified_holdout(&labels, 0.2, 42).unwrap();
    let second = split::stratified_holdout(&labels, 0.2, 42).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.evaluation.len(), 6);
    let held_neg = first
        .evaluation
        .iter()
        .filter(|&&i| labels[i] == "neg")
        .count();
    assert_eq!(held_neg, 2);
    assert_eq!(first.train.len() + first.evaluation.len(), labels.len());
}

#[test]
fn kfold_covers_every_row_once() {
    let labels: Vec<String> = (0..23)
        .map(|i| ["a", "b", "c"][i % 3].to_string())
        .collect();
    let folds = split::stratified_kfold(&labels, 5, 42).unwrap();
    assert_eq!(folds.len(), 5);
    let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.evaluation.clone()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..23).collect::<Vec<_>>());
    for fold in &folds {
        assert!(fold.evaluation.len() == 4 || fold.evaluation.len() == 5);
        assert_eq!(fold.train.len() + fold.evaluation.len(), 23);
    }
}

#[test]
fn singleton_class_is_insufficient_data() {
    let mut records = common::corpus();
    records.push(LabeledRecord {
        record: FeedbackRecord::new("Nada a declarar"),
        label: "indefinido".to_string(),
    });
    let err = training::train(&records, &common::config(ClassifierKind::Logistic)).unwrap_err();
    assert!(matches!(err, Error::InsufficientData(_)), "{err}");
}

#[test]
fn training_selects_and_evaluates_a_model() {
    let config = common::config(ClassifierKind::Logistic);
    let (artifact, report) = training::train(&common::corpus(), &config).unwrap();

    assert_eq!(report.candidates.len(), config.grid.len());
    assert_eq!(report.train_size + report.holdout_size, 45);
    assert_eq!(report.holdout_size, 9);
    assert_eq!(report.label_distribution.get("positivo"), Some(&15));
    assert_eq!(
        report.label_distribution.keys().collect::<Vec<_>>(),
        vec!["positivo", "negativo", "neutro"]
    );
    assert_eq!(report.best_params, report.candidates[report.best_index].params);
    assert!(report.best_cv_macro_f1 > 0.9);
    assert!(report.holdout.macro_avg.f1 > 0.9);
    assert_eq!(artifact.params(), &report.best_params);

    let mut labels = artifact.labels().to_vec();
    labels.sort();
    assert_eq!(labels, vec!["negativo", "neutro", "positivo"]);
}

#[test]
fn training_is_reproducible() {
    let config = common::config(ClassifierKind::LinearSvm);
    let (_, first) = training::train(&common::corpus(), &config).unwrap();
    let (_, second) = training::train(&common::corpus(), &config).unwrap();
    assert_eq!(first.best_params, second.best_params);
    assert_eq!(first.best_index, second.best_index);
    assert_eq!(first.holdout, second.holdout);
    assert_eq!(first.candidates, second.candidates);
}

#[test]
fn equal_scores_keep_the_first_candidate() {
    let mut config = common::config(ClassifierKind::Logistic);
    config.grid.c_values = vec![1.0, 1.0, 1.0];
    config.grid.min_df = vec![DocFrequency::Count(1)];
    config.grid.ngram_ranges = vec![insightclass::nlp::NgramRange::UNIGRAMS];
    let (_, report) = training::train(&common::corpus(), &config).unwrap();
    assert_eq!(report.candidates.len(), 3);
    assert_eq!(report.candidates[0].mean_macro_f1, report.candidates[2].mean_macro_f1);
    assert_eq!(report.best_index, 0);
}

#[test]
fn failing_candidates_are_skipped() {
    let mut config = common::config(ClassifierKind::Logistic);
    config.grid.min_df = vec![DocFrequency::Count(1000), DocFrequency::Count(1)];
    let (_, report) = training::train(&common::corpus(), &config).unwrap();
    let failed = report
        .candidates
        .iter()
        .filter(|c| c.params.tfidf.min_df == DocFrequency::Count(1000));
    for candidate in failed {
        assert!(candidate.mean_macro_f1.is_none());
        assert!(candidate.error.is_some());
    }
    assert_eq!(report.best_params.tfidf.min_df, DocFrequency::Count(1));
}

#[test]
fn grid_where_every_candidate_fails_is_a_training_failure() {
    let config = TrainConfig {
        grid: ParamGrid {
            min_df: vec![DocFrequency::Count(1000)],
            ..ParamGrid::default()
        },
        ..TrainConfig::default()
    };
    let err = training::train(&common::corpus(), &config).unwrap_err();
    assert!(matches!(err, Error::TrainingFailure { .. }), "{err}");
}

#[test]
fn default_grid_enumerates_ngram_range_fastest() {
    let candidates = ParamGrid::default().candidates(1000);
    assert_eq!(candidates.len(), 18);
    assert_eq!(
        candidates[0].to_string(),
        "classifier=logistic C=0.1 max_df=1.0 min_df=2 ngram_range=(1, 1)"
    );
    assert_eq!(
        candidates[1].to_string(),
        "classifier=logistic C=0.1 max_df=1.0 min_df=2 ngram_range=(1, 2)"
    );
    assert_eq!(
        candidates[17].to_string(),
        "classifier=logistic C=10 max_df=1.0 min_df=5 ngram_range=(1, 2)"
    );
}
