//! Run configuration, threaded explicitly through the call chain.

use nassai_core::{Mode, SplitConfig, Vectorization};
use serde::{Deserialize, Serialize};

use crate::artifact::ArtifactConfig;

/// Default dimensionality of word and document vectors.
pub const DEFAULT_VECTOR_SIZE: usize = 300;

/// Hyperparameters shared by the classical estimators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EstimatorParams {
    /// Additive (Laplace) smoothing for the naive Bayes variants.
    pub smoothing: f64,
    /// L2 penalty for the linear models.
    pub regularization: f32,
    pub learning_rate: f32,
    /// Passes over the training set for the linear models.
    pub epochs: usize,
    pub seed: u64,
}

impl Default for EstimatorParams {
    fn default() -> Self {
        Self {
            smoothing: 1.0,
            regularization: 1e-4,
            learning_rate: 0.1,
            epochs: 20,
            seed: 42,
        }
    }
}

impl EstimatorParams {
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f64) -> Self {
        self.smoothing = smoothing;
        self
    }

    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Hyperparameters of the feed-forward network family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NetworkParams {
    /// Number of hidden layers.
    pub layers: usize,
    /// Width of every hidden layer.
    pub units: usize,
    pub dropout: f32,
    pub batch: usize,
    pub epochs: usize,
    pub learning_rate: f64,
    pub seed: u64,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            layers: 4,
            units: 256,
            dropout: 0.25,
            batch: 200,
            epochs: 200,
            learning_rate: 1e-3,
            seed: 42,
        }
    }
}

impl NetworkParams {
    #[must_use]
    pub fn with_layers(mut self, layers: usize) -> Self {
        self.layers = layers;
        self
    }

    #[must_use]
    pub fn with_units(mut self, units: usize) -> Self {
        self.units = units;
        self
    }

    #[must_use]
    pub fn with_dropout(mut self, dropout: f32) -> Self {
        self.dropout = dropout;
        self
    }

    #[must_use]
    pub fn with_batch(mut self, batch: usize) -> Self {
        self.batch = batch;
        self
    }

    #[must_use]
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Options for one call to [`train`](crate::trainer::train).
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOptions {
    pub mode: Mode,
    pub vectorization: Vectorization,
    /// Expected dimensionality of the loaded embedding sources.
    pub vector_size: usize,
    pub split: SplitConfig,
    /// Where to persist the trained model. `None` keeps it in memory only.
    pub artifacts: Option<ArtifactConfig>,
}

impl TrainOptions {
    pub fn new(mode: Mode, vectorization: Vectorization) -> Self {
        Self {
            mode,
            vectorization,
            vector_size: DEFAULT_VECTOR_SIZE,
            split: SplitConfig::default(),
            artifacts: None,
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_vectorization(mut self, vectorization: Vectorization) -> Self {
        self.vectorization = vectorization;
        self
    }

    #[must_use]
    pub fn with_vector_size(mut self, vector_size: usize) -> Self {
        self.vector_size = vector_size;
        self
    }

    #[must_use]
    pub fn with_split(mut self, split: SplitConfig) -> Self {
        self.split = split;
        self
    }

    #[must_use]
    pub fn with_artifacts(mut self, artifacts: ArtifactConfig) -> Self {
        self.artifacts = Some(artifacts);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_defaults_match_cli_defaults() {
        let params = NetworkParams::default();
        assert_eq!(params.batch, 200);
        assert_eq!(params.epochs, 200);
        assert_eq!(params.layers, 4);
        assert!((params.dropout - 0.25).abs() < f32::EPSILON);
    }

    #[test]
    fn builder_overrides_fields() {
        let options = TrainOptions::new(Mode::Tfidf, Vectorization::Tfidf)
            .with_vector_size(100)
            .with_mode(Mode::Word2Vec)
            .with_vectorization(Vectorization::MeanEmbedding);
        assert_eq!(options.vector_size, 100);
        assert_eq!(options.mode, Mode::Word2Vec);
        assert_eq!(options.vectorization, Vectorization::MeanEmbedding);
        assert!(options.artifacts.is_none());
        assert_eq!(options.split, SplitConfig::default());
    }
}
