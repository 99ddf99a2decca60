use std::path::{Path, PathBuf};

use nassai_core::{
    load_document_vectors, load_word_vectors, Backend, Document, FeatureSources, Mode,
    NassaiError, Vectorization,
};
use nassai_trainer::model::{BernoulliNb, LogisticRegression, MultinomialNb};
use nassai_trainer::{
    model_list, train, ArtifactConfig, ArtifactStore, EstimatorParams, NetworkParams,
    ResultsLog, RunDriver, RunEntry, TrainOptions,
};

const SPORTS: [&str; 3] = [
    "goal striker match",
    "striker scored goal late",
    "match ended with a goal",
];
const POLITICS: [&str; 3] = [
    "senate vote bill",
    "the senate passed the bill",
    "vote on the budget bill",
];

/// `n` rows alternating between the two classes.
fn write_dataset(dir: &Path, n: usize) -> PathBuf {
    let path = dir.join("clean_data.csv");
    let mut text = String::from("text,label\n");
    for i in 0..n {
        let (sentence, label) = if i % 2 == 0 {
            (SPORTS[i / 2 % 3], "sports")
        } else {
            (POLITICS[i / 2 % 3], "politics")
        };
        text.push_str(&format!("{sentence},{label}\n"));
    }
    std::fs::write(&path, text).unwrap();
    path
}

fn write_word_vectors(dir: &Path) -> PathBuf {
    let path = dir.join("words.vec");
    let lines = [
        "6 4",
        "goal 1.0 -0.5 0.0 0.1",
        "striker 0.9 -0.4 0.1 0.0",
        "match 0.8 -0.6 0.0 0.2",
        "senate -0.7 1.0 0.1 0.0",
        "vote -0.9 0.8 0.0 0.1",
        "bill -0.8 0.9 0.2 0.0",
    ];
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

/// Document vectors `train_0..train_{n-1}` that carry the class signal.
fn write_doc_vectors(dir: &Path, n: usize) -> PathBuf {
    let path = dir.join("docs.vec");
    let mut text = format!("{n} 3\n");
    for i in 0..n {
        let v = if i % 2 == 0 { "1.0 0.0 0.5" } else { "0.0 1.0 0.5" };
        text.push_str(&format!("train_{i} {v}\n"));
    }
    std::fs::write(&path, text).unwrap();
    path
}

#[test]
fn tfidf_batch_logs_saves_and_predicts() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path(), 60);
    let models = dir.path().join("models");
    let results = dir.path().join("results.csv");

    let options = TrainOptions::new(Mode::Tfidf, Vectorization::Tfidf)
        .with_artifacts(ArtifactConfig::new(&models));
    let driver = RunDriver::new(&data, options, ResultsLog::new(&results))
        .with_using(Backend::Estimator);
    let entries = model_list(
        Mode::Tfidf,
        Backend::Estimator,
        &EstimatorParams::default(),
        &NetworkParams::default(),
    );

    let records = driver.run(entries, Mode::Tfidf).unwrap();
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| (r.f1 - 1.0).abs() < 1e-9));
    assert!(records.iter().all(|r| r.using == Some(Backend::Estimator)));

    let logged = driver.log().read_all().unwrap();
    let names: Vec<&str> = logged.iter().map(|r| r.model_name.as_str()).collect();
    assert_eq!(names, vec!["bnb", "mnb", "linear_svm", "logreg"]);

    let store = ArtifactStore::new(ArtifactConfig::new(&models));
    assert!(models.join("tfidf_mnb.pkl").exists());
    assert!(models.join("tfidf_mnb.json").exists());

    let loaded = store.load(Mode::Tfidf, "mnb").unwrap();
    let tokens = vec![Document::new("late goal by striker").tokens()];
    let features = loaded
        .manifest
        .pipeline
        .transform(&tokens, &FeatureSources::default())
        .unwrap();
    let predicted = loaded.classifier.predict(&features).unwrap();
    let labels = loaded.manifest.encoder().inverse_transform(&predicted).unwrap();
    assert_eq!(labels, vec!["sports"]);
}

#[test]
fn word2vec_pooling_trains_with_loaded_vectors() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path(), 40);
    let words = load_word_vectors(write_word_vectors(dir.path())).unwrap();
    let sources = FeatureSources {
        word_vectors: Some(&words),
        document_vectors: None,
    };

    for vectorization in [Vectorization::MeanEmbedding, Vectorization::TfidfEmbedding] {
        let mut model = LogisticRegression::new(&EstimatorParams::default());
        let options = TrainOptions::new(Mode::Word2Vec, vectorization).with_vector_size(4);
        let outcome = train(&mut model, &data, "logreg", &options, &sources).unwrap();
        assert!(outcome.score > 0.9, "{vectorization}: {}", outcome.score);
    }
}

#[test]
fn vector_size_is_checked_against_embeddings() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path(), 40);
    let words = load_word_vectors(write_word_vectors(dir.path())).unwrap();
    let sources = FeatureSources {
        word_vectors: Some(&words),
        document_vectors: None,
    };

    let mut model = LogisticRegression::new(&EstimatorParams::default());
    let options = TrainOptions::new(Mode::Word2Vec, Vectorization::MeanEmbedding);
    let err = train(&mut model, &data, "logreg", &options, &sources).unwrap_err();
    assert!(matches!(
        err,
        NassaiError::DimensionMismatch {
            expected: 300,
            found: 4
        }
    ));
}

#[test]
fn doc2vec_looks_up_every_document() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path(), 30);

    let complete = load_document_vectors(write_doc_vectors(dir.path(), 30)).unwrap();
    let options = TrainOptions::new(Mode::Doc2Vec, Vectorization::DocumentEmbedding)
        .with_vector_size(3);
    let mut model = BernoulliNb::new(&EstimatorParams::default());
    let sources = FeatureSources {
        word_vectors: None,
        document_vectors: Some(&complete),
    };
    let outcome = train(&mut model, &data, "bnb", &options, &sources).unwrap();
    assert!((outcome.score - 1.0).abs() < 1e-9);

    let partial = load_document_vectors(write_doc_vectors(dir.path(), 29)).unwrap();
    let sources = FeatureSources {
        word_vectors: None,
        document_vectors: Some(&partial),
    };
    let err = train(&mut model, &data, "bnb", &options, &sources).unwrap_err();
    match err {
        NassaiError::EmbeddingLookup { tag } => assert_eq!(tag, "train_29"),
        other => panic!("expected lookup error, got {other}"),
    }
}

#[test]
fn failing_entry_aborts_batch_after_logging_earlier_runs() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path(), 40);
    let results = dir.path().join("results.csv");
    let words = load_word_vectors(write_word_vectors(dir.path())).unwrap();
    let params = EstimatorParams::default();

    let entries = vec![
        RunEntry::new(
            "logreg_mean_embedding",
            Vectorization::MeanEmbedding,
            Box::new(LogisticRegression::new(&params)),
        ),
        // Pooled vectors have negative components.
        RunEntry::new(
            "mnb_mean_embedding",
            Vectorization::MeanEmbedding,
            Box::new(MultinomialNb::new(&params)),
        ),
        RunEntry::new(
            "bnb_mean_embedding",
            Vectorization::MeanEmbedding,
            Box::new(BernoulliNb::new(&params)),
        ),
    ];

    let options = TrainOptions::new(Mode::Word2Vec, Vectorization::MeanEmbedding)
        .with_vector_size(4);
    let driver = RunDriver::new(&data, options, ResultsLog::new(&results)).with_sources(
        FeatureSources {
            word_vectors: Some(&words),
            document_vectors: None,
        },
    );

    let err = driver.run(entries, Mode::Word2Vec).unwrap_err();
    assert!(matches!(err, NassaiError::ModelFit(_)));

    let logged = driver.log().read_all().unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].model_name, "logreg_mean_embedding");
    assert_eq!(logged[0].using, None);
}

#[test]
fn mode_and_vectorization_must_agree() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_dataset(dir.path(), 20);
    let driver = RunDriver::new(
        &data,
        TrainOptions::new(Mode::Tfidf, Vectorization::Tfidf),
        ResultsLog::new(dir.path().join("results.csv")),
    );
    let entries = vec![RunEntry::new(
        "bnb_doc_embedding",
        Vectorization::DocumentEmbedding,
        Box::new(BernoulliNb::new(&EstimatorParams::default())),
    )];
    let err = driver.run(entries, Mode::Tfidf).unwrap_err();
    assert!(matches!(err, NassaiError::UnsupportedCombination(_)));
    assert!(!dir.path().join("results.csv").exists());
}
