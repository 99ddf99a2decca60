//! Training orchestrator: split, featurise, encode, fit, score.

use std::path::Path;
use std::time::{Duration, Instant};

use chrono::Utc;
use nassai_core::{
    document_embedding, encode, split_indices, FeatureMatrix, FeaturePipeline, FeatureSources,
    LabeledDataset, NassaiError, Result, Split, Vectorization,
};

use crate::artifact::{ArtifactManifest, ArtifactStore};
use crate::config::TrainOptions;
use crate::model::{Classifier, Labeled};

/// Result of one training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainOutcome {
    /// Macro F1 on the test partition.
    pub score: f64,
    /// Wall-clock time spent in `fit`.
    pub duration: Duration,
}

impl TrainOutcome {
    pub fn duration_secs(&self) -> f64 {
        self.duration.as_secs_f64()
    }
}

/// Load the CSV at `dataset_path` and train `model` on it.
pub fn train(
    model: &mut dyn Classifier,
    dataset_path: &Path,
    run_name: &str,
    options: &TrainOptions,
    sources: &FeatureSources<'_>,
) -> Result<TrainOutcome> {
    let dataset = LabeledDataset::from_csv(dataset_path)?;
    train_on(model, &dataset, run_name, options, sources)
}

/// Train `model` on an in-memory dataset.
///
/// Fit errors propagate unchanged; nothing is retried.
pub fn train_on(
    model: &mut dyn Classifier,
    dataset: &LabeledDataset,
    run_name: &str,
    options: &TrainOptions,
    sources: &FeatureSources<'_>,
) -> Result<TrainOutcome> {
    tracing::info!(
        run = run_name,
        kind = %model.kind(),
        vectorization = %options.vectorization,
        rows = dataset.len(),
        "training"
    );

    let split = split_indices(dataset.len(), &options.split)?;
    if split.train.is_empty() || split.test.is_empty() {
        return Err(NassaiError::data(format!(
            "{} rows are too few to split into train and test partitions",
            dataset.len()
        )));
    }

    let (features, pipeline) = featurise(dataset, &split.train, options, sources)?;
    let (_, encoder) = encode(&dataset.labels)?;
    let partition = |indices: &[usize]| -> Result<_> {
        let labels: Vec<&str> = indices.iter().map(|&i| dataset.labels[i].as_str()).collect();
        Ok((features.select_rows(indices), encoder.encode_with(&labels)?))
    };
    let (train_x, train_y) = partition(&split.train)?;
    let (val_x, val_y) = partition(&split.validation)?;
    let (test_x, test_y) = partition(&split.test)?;

    let validation = if val_x.is_empty() {
        None
    } else {
        Some(Labeled::new(&val_x, &val_y)?)
    };

    let started = Instant::now();
    model.fit(Labeled::new(&train_x, &train_y)?, validation)?;
    let duration = started.elapsed();

    let score = model.score(&test_x, &test_y.indices)?;
    tracing::info!(
        run = run_name,
        f1 = score,
        seconds = duration.as_secs_f64(),
        "finished"
    );

    if let Some(config) = &options.artifacts {
        let manifest = ArtifactManifest {
            name: run_name.to_string(),
            mode: options.mode,
            kind: model.kind(),
            family: model.kind().family(),
            classes: encoder.classes().to_vec(),
            pipeline,
            vector_size: options.vector_size,
            f1: score,
            trained_at: Utc::now(),
        };
        ArtifactStore::new(config.clone()).save(&*model, &manifest)?;
    }

    Ok(TrainOutcome { score, duration })
}

/// Feature rows for the whole dataset in file order, plus the pipeline that
/// produced them. Fitted state comes from the training rows only.
fn featurise(
    dataset: &LabeledDataset,
    train_rows: &[usize],
    options: &TrainOptions,
    sources: &FeatureSources<'_>,
) -> Result<(FeatureMatrix, FeaturePipeline)> {
    if options.vectorization == Vectorization::DocumentEmbedding {
        let vectors = sources.document_vectors()?;
        vectors.ensure_dim(options.vector_size)?;
        // Document vectors were trained on the whole corpus in file order.
        let matrix = document_embedding(&dataset.documents, Split::Train, vectors)?;
        return Ok((matrix, FeaturePipeline::DocumentEmbedding));
    }

    if options.vectorization.needs_word_vectors() {
        sources.word_vectors()?.ensure_dim(options.vector_size)?;
    }

    let tokens = dataset.tokens();
    let train_tokens: Vec<Vec<String>> = train_rows.iter().map(|&i| tokens[i].clone()).collect();
    let pipeline = FeaturePipeline::fit(options.vectorization, &train_tokens);
    let matrix = pipeline.transform(&tokens, sources)?;
    Ok((matrix, pipeline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EstimatorParams;
    use crate::model::MultinomialNb;
    use nassai_core::{Document, Mode};

    fn dataset(n: usize) -> LabeledDataset {
        let (docs, labels) = (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    (Document::new("goal match striker"), "sport".to_string())
                } else {
                    (Document::new("vote senate bill"), "politics".to_string())
                }
            })
            .unzip();
        LabeledDataset::new(docs, labels).unwrap()
    }

    #[test]
    fn separable_tfidf_run_scores_perfectly() {
        let mut model = MultinomialNb::new(&EstimatorParams::default());
        let options = TrainOptions::new(Mode::Tfidf, Vectorization::Tfidf);
        let outcome = train_on(
            &mut model,
            &dataset(50),
            "mnb",
            &options,
            &FeatureSources::default(),
        )
        .unwrap();
        assert!((outcome.score - 1.0).abs() < 1e-9);
        assert!(outcome.duration_secs() >= 0.0);
    }

    #[test]
    fn tiny_dataset_is_data_error() {
        let mut model = MultinomialNb::new(&EstimatorParams::default());
        let options = TrainOptions::new(Mode::Tfidf, Vectorization::Tfidf);
        let err = train_on(
            &mut model,
            &dataset(1),
            "mnb",
            &options,
            &FeatureSources::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NassaiError::Data(_)));
    }

    #[test]
    fn embedding_mode_without_vectors_is_unsupported() {
        let mut model = MultinomialNb::new(&EstimatorParams::default());
        let options = TrainOptions::new(Mode::Word2Vec, Vectorization::MeanEmbedding);
        let err = train_on(
            &mut model,
            &dataset(20),
            "mnb",
            &options,
            &FeatureSources::default(),
        )
        .unwrap_err();
        assert!(matches!(err, NassaiError::UnsupportedCombination(_)));
    }
}
