//! # Nassai
//!
//! Text-classification experimentation harness. Turns labeled documents into
//! feature vectors (TF-IDF, pooled word embeddings or document embeddings),
//! trains interchangeable classifiers behind one contract and appends
//! comparable evaluation records to a results log.
//!
//! This crate re-exports [`nassai_core`] and [`nassai_trainer`].

pub use nassai_core;
pub use nassai_trainer;

pub use nassai_core::{
    Backend, Document, EvaluationRecord, FeatureMatrix, FeaturePipeline, LabelEncoder, Mode,
    NassaiError, Result, Vectorization,
};
pub use nassai_trainer::{
    ArtifactConfig, ArtifactStore, Classifier, ClassifierKind, ModelFamily, RunDriver, RunEntry,
    TrainOptions, TrainOutcome,
};
