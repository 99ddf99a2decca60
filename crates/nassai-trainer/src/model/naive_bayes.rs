//! Bernoulli and multinomial naive Bayes.

use std::path::Path;

use nassai_core::{FeatureMatrix, NassaiError, Result};
use serde::{Deserialize, Serialize};

use super::codec::{write_estimator, SavedEstimator};
use super::{argmax, check_width, not_fitted, Classifier, ClassifierKind, Labeled};
use crate::config::EstimatorParams;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct BernoulliState {
    class_log_prior: Vec<f64>,
    /// `ln p(x_j = 1 | c)` per class.
    log_prob: Vec<Vec<f64>>,
    /// `ln p(x_j = 0 | c)` per class.
    log_neg_prob: Vec<Vec<f64>>,
}

/// Naive Bayes over binary features. A feature counts as present when it
/// exceeds `threshold`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BernoulliNb {
    alpha: f64,
    threshold: f32,
    state: Option<BernoulliState>,
}

impl BernoulliNb {
    pub fn new(params: &EstimatorParams) -> Self {
        Self {
            alpha: params.smoothing,
            threshold: 0.0,
            state: None,
        }
    }
}

impl Classifier for BernoulliNb {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::BernoulliNb
    }

    fn fit(&mut self, train: Labeled<'_>, _validation: Option<Labeled<'_>>) -> Result<()> {
        check_fit_input(&train, self.alpha)?;
        let features = train.features;
        let labels = &train.labels.indices;
        let (n_classes, n_features) = (train.labels.num_classes, features.cols());

        let class_counts = class_counts(labels, n_classes);
        let mut present = vec![vec![0.0f64; n_features]; n_classes];
        for (row, &c) in features.iter_rows().zip(labels) {
            for (acc, &v) in present[c].iter_mut().zip(row) {
                if v > self.threshold {
                    *acc += 1.0;
                }
            }
        }

        let mut log_prob = Vec::with_capacity(n_classes);
        let mut log_neg_prob = Vec::with_capacity(n_classes);
        for (c, counts) in present.into_iter().enumerate() {
            let denom = class_counts[c] as f64 + 2.0 * self.alpha;
            let p: Vec<f64> = counts.iter().map(|n| (n + self.alpha) / denom).collect();
            log_prob.push(p.iter().map(|p| p.ln()).collect());
            log_neg_prob.push(p.iter().map(|p| (1.0 - p).ln()).collect());
        }

        self.state = Some(BernoulliState {
            class_log_prior: log_prior(&class_counts, labels.len()),
            log_prob,
            log_neg_prob,
        });
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        let state = self.state.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        check_width(state.log_prob.first().map_or(0, Vec::len), features)?;

        Ok(features
            .iter_rows()
            .map(|row| {
                let scores: Vec<f64> = (0..state.class_log_prior.len())
                    .map(|c| {
                        let mut jll = state.class_log_prior[c];
                        for (j, &v) in row.iter().enumerate() {
                            jll += if v > self.threshold {
                                state.log_prob[c][j]
                            } else {
                                state.log_neg_prob[c][j]
                            };
                        }
                        jll
                    })
                    .collect();
                argmax(&scores)
            })
            .collect())
    }

    fn num_classes(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.class_log_prior.len())
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_estimator(path, &SavedEstimator::BernoulliNb(self.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct MultinomialState {
    class_log_prior: Vec<f64>,
    log_prob: Vec<Vec<f64>>,
}

/// Naive Bayes over non-negative count-like features (TF-IDF rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    alpha: f64,
    state: Option<MultinomialState>,
}

impl MultinomialNb {
    pub fn new(params: &EstimatorParams) -> Self {
        Self {
            alpha: params.smoothing,
            state: None,
        }
    }
}

impl Classifier for MultinomialNb {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::MultinomialNb
    }

    fn fit(&mut self, train: Labeled<'_>, _validation: Option<Labeled<'_>>) -> Result<()> {
        check_fit_input(&train, self.alpha)?;
        let features = train.features;
        if features.as_slice().iter().any(|&v| v < 0.0) {
            return Err(NassaiError::fit(
                "multinomial naive Bayes needs non-negative features",
            ));
        }
        let labels = &train.labels.indices;
        let (n_classes, n_features) = (train.labels.num_classes, features.cols());

        let mut totals = vec![vec![0.0f64; n_features]; n_classes];
        for (row, &c) in features.iter_rows().zip(labels) {
            for (acc, &v) in totals[c].iter_mut().zip(row) {
                *acc += f64::from(v);
            }
        }

        let smoothing = self.alpha * n_features as f64;
        let log_prob = totals
            .iter()
            .map(|counts| {
                let denom = counts.iter().sum::<f64>() + smoothing;
                counts.iter().map(|n| ((n + self.alpha) / denom).ln()).collect()
            })
            .collect();

        self.state = Some(MultinomialState {
            class_log_prior: log_prior(&class_counts(labels, n_classes), labels.len()),
            log_prob,
        });
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        let state = self.state.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        check_width(state.log_prob.first().map_or(0, Vec::len), features)?;

        Ok(features
            .iter_rows()
            .map(|row| {
                let scores: Vec<f64> = state
                    .class_log_prior
                    .iter()
                    .zip(&state.log_prob)
                    .map(|(prior, log_prob)| {
                        prior
                            + row
                                .iter()
                                .zip(log_prob)
                                .map(|(&v, lp)| f64::from(v) * lp)
                                .sum::<f64>()
                    })
                    .collect();
                argmax(&scores)
            })
            .collect())
    }

    fn num_classes(&self) -> usize {
        self.state.as_ref().map_or(0, |s| s.class_log_prior.len())
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_estimator(path, &SavedEstimator::MultinomialNb(self.clone()))
    }
}

fn check_fit_input(train: &Labeled<'_>, alpha: f64) -> Result<()> {
    if train.rows() == 0 {
        return Err(NassaiError::data("empty training set"));
    }
    if alpha <= 0.0 {
        return Err(NassaiError::fit(format!("smoothing must be positive, got {alpha}")));
    }
    Ok(())
}

fn class_counts(labels: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for &c in labels {
        counts[c] += 1;
    }
    counts
}

/// Empirical log prior; classes absent from training get `-inf`.
fn log_prior(counts: &[usize], total: usize) -> Vec<f64> {
    counts
        .iter()
        .map(|&n| {
            if n == 0 {
                f64::NEG_INFINITY
            } else {
                (n as f64 / total as f64).ln()
            }
        })
        .collect()
}
