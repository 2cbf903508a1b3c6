use insightclass::{
    nlp::{DocFrequency, NgramRange, TfidfConfig, TfidfVectorizer},
    Error,
};

fn corpus() -> Vec<String> {
    vec![
        "[ROLE=aluno] [TARGET=professor] aula muito boa".to_string(),
        "[ROLE=aluno] [TARGET=professor] aula muito ruim".to_string(),
        "[ROLE=professor] [TARGET=curso] turma boa".to_string(),
    ]
}

#[test]
fn transform_before_fit_is_rejected() {
    let vectorizer = TfidfVectorizer::new(TfidfConfig::default());
    let err = vectorizer.transform(&["qualquer texto"]).unwrap_err();
    assert!(matches!(err, Error::NotFitted(_)));
}

#[test]
fn vocabulary_is_sorted_and_tags_become_tokens() {
    let mut vectorizer = TfidfVectorizer::new(TfidfConfig::default());
    vectorizer.fit(&corpus()).unwrap();
    let vocabulary = vectorizer.vocabulary();
    assert_eq!(
        vocabulary,
        vec![
            "aluno",
            "aula",
            "boa",
            "curso",
            "muito",
            "professor",
            "role",
            "ruim",
            "target",
            "turma"
        ]
    );
}

#[test]
fn rows_are_unit_length_and_unseen_terms_are_ignored() {
    let mut vectorizer = TfidfVectorizer::new(TfidfConfig::default());
    let matrix = vectorizer.fit_transform(&corpus()).unwrap();
    assert_eq!(matrix.dim(), (3, vectorizer.vocabulary_size()));
    for row in matrix.rows() {
        let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-9);
    }

    let unseen = vectorizer.transform(&["xyz qwerty"]).unwrap();
    assert!(unseen.iter().all(|v| *v == 0.0));
}

#[test]
fn rarer_terms_weigh_more() {
    let mut vectorizer = TfidfVectorizer::new(TfidfConfig::default());
    vectorizer.fit(&corpus()).unwrap();
    let row = vectorizer.transform(&["role ruim"]).unwrap();
    let vocabulary = vectorizer.vocabulary();
    let col = |term: &str| vocabulary.iter().position(|t| *t == term).unwrap();
    assert!(row[[0, col("ruim")]] > row[[0, col("role")]]);
}

#[test]
fn bigrams_extend_the_vocabulary() {
    let config = TfidfConfig {
        ngram_range: NgramRange::UNIGRAMS_BIGRAMS,
        ..TfidfConfig::default()
    };
    let mut vectorizer = TfidfVectorizer::new(config);
    vectorizer.fit(&corpus()).unwrap();
    let vocabulary = vectorizer.vocabulary();
    assert!(vocabulary.contains(&"muito boa"));
    assert!(vocabulary.contains(&"role aluno"));
    assert!(vocabulary.contains(&"boa"));
}

#[test]
fn document_frequency_bounds_prune_terms() {
    let config = TfidfConfig {
        min_df: DocFrequency::Count(2),
        max_df: DocFrequency::Proportion(0.9),
        ..TfidfConfig::default()
    };
    let mut vectorizer = TfidfVectorizer::new(config);
    vectorizer.fit(&corpus()).unwrap();
    // present in exactly two of the three documents
    assert_eq!(
        vectorizer.vocabulary(),
        vec!["aluno", "aula", "boa", "muito"]
    );
}

#[test]
fn pruning_everything_is_an_error() {
    let config = TfidfConfig {
        min_df: DocFrequency::Count(10),
        ..TfidfConfig::default()
    };
    let mut vectorizer = TfidfVectorizer::new(config);
    let err = vectorizer.fit(&corpus()).unwrap_err();
    assert!(matches!(err, Error::EmptyVocabulary { .. }));
    assert!(!vectorizer.is_fitted());
}

#[test]
fn repeated_fits_are_identical() {
    let docs = corpus();
    let mut first = TfidfVectorizer::new(TfidfConfig::default());
    let mut second = TfidfVectorizer::new(TfidfConfig::default());
    let a = first.fit_transform(&docs).unwrap();
    let b = second.fit_transform(&docs).unwrap();
    assert_eq!(first.vocabulary(), second.vocabulary());
    assert_eq!(a, b);
}
