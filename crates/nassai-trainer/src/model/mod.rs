//! # Model registry
//!
//! Every classifier implements [`Classifier`]. Callers pick one by
//! [`ClassifierKind`] and never see which storage family backs it: classical
//! estimators are serialised with bincode inside a gzip stream, networks are
//! written as safetensors with their architecture in the header metadata.

mod codec;
pub mod linear;
pub mod mlp;
pub mod naive_bayes;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use nassai_core::{macro_f1, EncodedLabels, FeatureMatrix, NassaiError, Result};
use serde::{Deserialize, Serialize};

pub use linear::{LinearSvm, LogisticRegression};
pub use mlp::Mlp;
pub use naive_bayes::{BernoulliNb, MultinomialNb};

use crate::config::{EstimatorParams, NetworkParams};

/// Features paired with their encoded labels.
#[derive(Debug, Clone, Copy)]
pub struct Labeled<'a> {
    pub features: &'a FeatureMatrix,
    pub labels: &'a EncodedLabels,
}

impl<'a> Labeled<'a> {
    pub fn new(features: &'a FeatureMatrix, labels: &'a EncodedLabels) -> Result<Self> {
        if features.rows() != labels.len() {
            return Err(NassaiError::data(format!(
                "{} feature rows but {} labels",
                features.rows(),
                labels.len()
            )));
        }
        Ok(Self { features, labels })
    }

    pub fn rows(&self) -> usize {
        self.features.rows()
    }
}

/// The capability every trainable classifier exposes.
pub trait Classifier {
    fn kind(&self) -> ClassifierKind;

    /// Train on `train`. Networks may use `validation` for per-epoch monitoring.
    fn fit(&mut self, train: Labeled<'_>, validation: Option<Labeled<'_>>) -> Result<()>;

    /// Predicted class index per row.
    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>>;

    /// Number of classes the model was fitted for; 0 before fitting.
    fn num_classes(&self) -> usize;

    /// Macro-averaged F1 of the predictions against `labels`.
    fn score(&self, features: &FeatureMatrix, labels: &[usize]) -> Result<f64> {
        if features.rows() != labels.len() {
            return Err(NassaiError::data(format!(
                "{} feature rows but {} labels",
                features.rows(),
                labels.len()
            )));
        }
        let predictions = self.predict(features)?;
        Ok(macro_f1(&predictions, labels, self.num_classes()))
    }

    fn save(&self, path: &Path) -> Result<()>;
}

/// How an artifact is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// Generic object serialisation, gzip-compressed.
    Estimator,
    /// Network-native weights plus architecture.
    Network,
}

impl ModelFamily {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Estimator => "pkl",
            Self::Network => "hdf5",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pkl" => Some(Self::Estimator),
            "hdf5" => Some(Self::Network),
            _ => None,
        }
    }
}

/// The concrete classifiers the registry can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    BernoulliNb,
    MultinomialNb,
    LinearSvm,
    LogisticRegression,
    Mlp,
}

impl ClassifierKind {
    pub const ALL: [ClassifierKind; 5] = [
        Self::BernoulliNb,
        Self::MultinomialNb,
        Self::LinearSvm,
        Self::LogisticRegression,
        Self::Mlp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BernoulliNb => "bnb",
            Self::MultinomialNb => "mnb",
            Self::LinearSvm => "linear_svm",
            Self::LogisticRegression => "logreg",
            Self::Mlp => "mlp",
        }
    }

    pub fn family(&self) -> ModelFamily {
        match self {
            Self::Mlp => ModelFamily::Network,
            _ => ModelFamily::Estimator,
        }
    }

    /// An unfitted classifier of this kind.
    pub fn build(
        &self,
        estimator: &EstimatorParams,
        network: &NetworkParams,
    ) -> Box<dyn Classifier> {
        match self {
            Self::BernoulliNb => Box::new(BernoulliNb::new(estimator)),
            Self::MultinomialNb => Box::new(MultinomialNb::new(estimator)),
            Self::LinearSvm => Box::new(LinearSvm::new(estimator)),
            Self::LogisticRegression => Box::new(LogisticRegression::new(estimator)),
            Self::Mlp => Box::new(Mlp::new(*network)),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassifierKind {
    type Err = NassaiError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| NassaiError::UnsupportedCombination(format!("unknown classifier {s:?}")))
    }
}

/// A classifier name as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelRef {
    Named(String),
    /// Whichever artifact is marked best for a mode. Resolved outside the registry.
    Best,
}

impl ModelRef {
    pub fn name(&self) -> Result<&str> {
        match self {
            Self::Named(name) => Ok(name),
            Self::Best => Err(NassaiError::UnsupportedCombination(
                "\"best\" must be resolved to a concrete classifier before loading".into(),
            )),
        }
    }
}

impl FromStr for ModelRef {
    type Err = NassaiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Err(NassaiError::data("empty classifier name")),
            "best" => Ok(Self::Best),
            name => Ok(Self::Named(name.to_string())),
        }
    }
}

/// Load any saved classifier, choosing the format by file extension.
pub fn load(path: &Path) -> Result<Box<dyn Classifier>> {
    let family = path
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ModelFamily::from_extension)
        .ok_or_else(|| {
            NassaiError::persistence(format!("unrecognised artifact {}", path.display()))
        })?;

    match family {
        ModelFamily::Estimator => codec::read_estimator(path),
        ModelFamily::Network => Ok(Box::new(Mlp::load(path)?)),
    }
}

/// Index of the largest value; the first one on ties.
pub(crate) fn argmax<T: PartialOrd + Copy>(values: &[T]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Number of distinct classes present in a training set.
pub(crate) fn distinct_classes(labels: &EncodedLabels) -> usize {
    let mut seen = vec![false; labels.num_classes];
    for &i in &labels.indices {
        if let Some(slot) = seen.get_mut(i) {
            *slot = true;
        }
    }
    seen.into_iter().filter(|&s| s).count()
}

pub(crate) fn check_width(expected: usize, features: &FeatureMatrix) -> Result<()> {
    if features.cols() != expected {
        return Err(NassaiError::DimensionMismatch {
            expected,
            found: features.cols(),
        });
    }
    Ok(())
}

pub(crate) fn not_fitted(kind: ClassifierKind) -> NassaiError {
    NassaiError::fit(format!("{kind} has not been fitted"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_round_trip() {
        for kind in ClassifierKind::ALL {
            assert_eq!(kind.as_str().parse::<ClassifierKind>().unwrap(), kind);
        }
        assert!("svm_rbf".parse::<ClassifierKind>().is_err());
    }

    #[test]
    fn family_selects_extension() {
        assert_eq!(ClassifierKind::Mlp.family().extension(), "hdf5");
        assert_eq!(ClassifierKind::LinearSvm.family().extension(), "pkl");
        assert_eq!(ModelFamily::from_extension("pkl"), Some(ModelFamily::Estimator));
        assert_eq!(ModelFamily::from_extension("json"), None);
    }

    #[test]
    fn best_is_recognised_but_not_resolved() {
        let best: ModelRef = "best".parse().unwrap();
        assert_eq!(best, ModelRef::Best);
        assert!(matches!(best.name(), Err(NassaiError::UnsupportedCombination(_))));

        let named: ModelRef = "mnb".parse().unwrap();
        assert_eq!(named.name().unwrap(), "mnb");
    }

    #[test]
    fn argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), 1);
        assert_eq!(argmax(&[f64::NEG_INFINITY, -3.0]), 1);
        assert_eq!(argmax::<f32>(&[]), 0);
    }

    #[test]
    fn unknown_extension_is_persistence_error() {
        let err = load(Path::new("models/tfidf_mnb.bin")).err().unwrap();
        assert!(matches!(err, NassaiError::Persistence(_)));
    }
}
