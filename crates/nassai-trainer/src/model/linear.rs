//! Linear classifiers trained with seeded stochastic gradient descent.
//!
//! [`LinearSvm`] fits one hinge-loss separator per class (one-vs-rest);
//! [`LogisticRegression`] fits a softmax over all classes. Both apply an L2
//! penalty and a decaying step `lr / (1 + lr * lambda * t)`.

use std::path::Path;

use nassai_core::{FeatureMatrix, NassaiError, Result};
use serde::{Deserialize, Serialize};

use super::codec::{write_estimator, SavedEstimator};
use super::{argmax, check_width, distinct_classes, not_fitted, Classifier, ClassifierKind, Labeled};
use crate::config::EstimatorParams;

/// Per-class weight rows and intercepts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct LinearState {
    weights: Vec<Vec<f32>>,
    bias: Vec<f32>,
}

impl LinearState {
    fn zeros(n_classes: usize, n_features: usize) -> Self {
        Self {
            weights: vec![vec![0.0; n_features]; n_classes],
            bias: vec![0.0; n_classes],
        }
    }

    fn n_features(&self) -> usize {
        self.weights.first().map_or(0, Vec::len)
    }

    fn decision(&self, row: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .zip(&self.bias)
            .map(|(w, b)| dot(w, row) + b)
            .collect()
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        check_width(self.n_features(), features)?;
        Ok(features
            .iter_rows()
            .map(|row| argmax(&self.decision(row)))
            .collect())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Shared SGD driver. `step` updates the state for one sample given the
/// current learning rate.
fn sgd<F>(params: &EstimatorParams, train: &Labeled<'_>, state: &mut LinearState, mut step: F)
where
    F: FnMut(&mut LinearState, &[f32], usize, f32),
{
    let mut rng = oorandom::Rand32::new(params.seed);
    let mut order: Vec<usize> = (0..train.rows()).collect();
    let mut t = 0usize;

    for epoch in 0..params.epochs {
        for i in (1..order.len()).rev() {
            let j = rng.rand_range(0..(i as u32 + 1)) as usize;
            order.swap(i, j);
        }
        for &i in &order {
            let lr = params.learning_rate
                / (1.0 + params.learning_rate * params.regularization * t as f32);
            let decay = 1.0 - lr * params.regularization;
            for w in state.weights.iter_mut().flatten() {
                *w *= decay;
            }
            step(state, train.features.row(i), train.labels.indices[i], lr);
            t += 1;
        }
        tracing::trace!(epoch, steps = t, "sgd epoch");
    }
}

fn check_linear_input(kind: ClassifierKind, train: &Labeled<'_>, params: &EstimatorParams) -> Result<()> {
    if train.rows() == 0 {
        return Err(NassaiError::data("empty training set"));
    }
    if distinct_classes(train.labels) < 2 {
        return Err(NassaiError::fit(format!(
            "{kind} needs at least two classes in the training set"
        )));
    }
    if params.learning_rate <= 0.0 || params.epochs == 0 {
        return Err(NassaiError::fit(format!(
            "{kind} needs a positive learning rate and at least one epoch"
        )));
    }
    Ok(())
}

/// One-vs-rest linear support vector machine (hinge loss).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSvm {
    params: EstimatorParams,
    state: Option<LinearState>,
}

impl LinearSvm {
    pub fn new(params: &EstimatorParams) -> Self {
        Self {
            params: *params,
            state: None,
        }
    }
}

impl Classifier for LinearSvm {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::LinearSvm
    }

    fn fit(&mut self, train: Labeled<'_>, _validation: Option<Labeled<'_>>) -> Result<()> {
        check_linear_input(self.kind(), &train, &self.params)?;
        let mut state = LinearState::zeros(train.labels.num_classes, train.features.cols());

        sgd(&self.params, &train, &mut state, |state, x, label, lr| {
            for c in 0..state.bias.len() {
                let y = if c == label { 1.0 } else { -1.0 };
                let margin = y * (dot(&state.weights[c], x) + state.bias[c]);
                if margin < 1.0 {
                    for (w, &v) in state.weights[c].iter_mut().zip(x) {
                        *w += lr * y * v;
                    }
                    state.bias[c] += lr * y;
                }
            }
        });

        self.state = Some(state);
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        self.state
            .as_ref()
            .ok_or_else(|| not_fitted(self.kind()))?
            .predict(features)
    }

    fn num_classes(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.bias.len())
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_estimator(path, &SavedEstimator::LinearSvm(self.clone()))
    }
}

/// Multinomial logistic regression (softmax, cross-entropy loss).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    params: EstimatorParams,
    state: Option<LinearState>,
}

impl LogisticRegression {
    pub fn new(params: &EstimatorParams) -> Self {
        Self {
            params: *params,
            state: None,
        }
    }

    /// Class probabilities per row.
    pub fn predict_proba(&self, features: &FeatureMatrix) -> Result<Vec<Vec<f32>>> {
        let state = self.state.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        check_width(state.n_features(), features)?;
        Ok(features
            .iter_rows()
            .map(|row| softmax(&state.decision(row)))
            .collect())
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&z| (z - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.into_iter().map(|e| e / sum).collect()
}

impl Classifier for LogisticRegression {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::LogisticRegression
    }

    fn fit(&mut self, train: Labeled<'_>, _validation: Option<Labeled<'_>>) -> Result<()> {
        check_linear_input(self.kind(), &train, &self.params)?;
        let mut state = LinearState::zeros(train.labels.num_classes, train.features.cols());

        sgd(&self.params, &train, &mut state, |state, x, label, lr| {
            let probs = softmax(&state.decision(x));
            for (c, p) in probs.into_iter().enumerate() {
                let grad = p - if c == label { 1.0 } else { 0.0 };
                for (w, &v) in state.weights[c].iter_mut().zip(x) {
                    *w -= lr * grad * v;
                }
                state.bias[c] -= lr * grad;
            }
        });

        self.state = Some(state);
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        self.state
            .as_ref()
            .ok_or_else(|| not_fitted(self.kind()))?
            .predict(features)
    }

    fn num_classes(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.bias.len())
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_estimator(path, &SavedEstimator::LogisticRegression(self.clone()))
    }
}
