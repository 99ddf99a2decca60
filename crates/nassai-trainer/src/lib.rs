//! # Nassai Trainer
//!
//! Classifier registry, artifact persistence, the training orchestrator and
//! the run driver that trains a list of models and logs one evaluation
//! record per run.

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod model;
pub mod runner;
pub mod trainer;

pub use artifact::{ArtifactConfig, ArtifactManifest, ArtifactStore, LoadedModel};
pub use catalog::model_list;
pub use config::{EstimatorParams, NetworkParams, TrainOptions, DEFAULT_VECTOR_SIZE};
pub use model::{Classifier, ClassifierKind, Labeled, ModelFamily, ModelRef};
pub use runner::{ResultsLog, RunDriver, RunEntry};
pub use trainer::{train, train_on, TrainOutcome};
