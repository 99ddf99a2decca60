//! Label encoding.
//!
//! Classes are ordered lexicographically, so the same label set always yields
//! the same index mapping. A fitted encoder must be kept alongside the model
//! it was used to train: refitting on a different label set may reorder classes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{NassaiError, Result};

/// Maps class names to contiguous indices and back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

/// Labels encoded by one [`LabelEncoder`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedLabels {
    /// Class index per row.
    pub indices: Vec<usize>,
    /// Row-major `rows x num_classes` one-hot matrix.
    pub one_hot: Vec<f32>,
    pub num_classes: usize,
}

impl EncodedLabels {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn one_hot_row(&self, i: usize) -> &[f32] {
        &self.one_hot[i * self.num_classes..(i + 1) * self.num_classes]
    }
}

impl LabelEncoder {
    /// Learn the distinct classes of `labels`.
    pub fn fit<S: AsRef<str>>(labels: &[S]) -> Result<Self> {
        if labels.is_empty() {
            return Err(NassaiError::data("cannot fit a label encoder on an empty label set"));
        }
        let classes: BTreeSet<&str> = labels.iter().map(AsRef::as_ref).collect();
        Ok(Self {
            classes: classes.into_iter().map(str::to_string).collect(),
        })
    }

    /// Rebuild an encoder from a recorded class list.
    pub fn from_classes(mut classes: Vec<String>) -> Self {
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(label))
            .ok()
    }

    pub fn transform<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>> {
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                self.index_of(label)
                    .ok_or_else(|| NassaiError::data(format!("unknown label {label:?}")))
            })
            .collect()
    }

    pub fn inverse_transform(&self, indices: &[usize]) -> Result<Vec<String>> {
        indices
            .iter()
            .map(|&i| {
                self.classes.get(i).cloned().ok_or_else(|| {
                    NassaiError::data(format!(
                        "class index {i} out of range for {} classes",
                        self.classes.len()
                    ))
                })
            })
            .collect()
    }

    /// Expand indices into one-hot rows of width [`num_classes`](Self::num_classes).
    pub fn one_hot(&self, indices: &[usize]) -> Vec<f32> {
        let width = self.classes.len();
        let mut out = vec![0.0f32; indices.len() * width];
        for (row, &i) in indices.iter().enumerate() {
            if i < width {
                out[row * width + i] = 1.0;
            }
        }
        out
    }

    pub fn encode_with<S: AsRef<str>>(&self, labels: &[S]) -> Result<EncodedLabels> {
        let indices = self.transform(labels)?;
        let one_hot = self.one_hot(&indices);
        Ok(EncodedLabels {
            indices,
            one_hot,
            num_classes: self.num_classes(),
        })
    }
}

/// Fit a fresh encoder on `labels` and encode them with it.
pub fn encode<S: AsRef<str>>(labels: &[S]) -> Result<(EncodedLabels, LabelEncoder)> {
    let encoder = LabelEncoder::fit(labels)?;
    let encoded = encoder.encode_with(labels)?;
    Ok((encoded, encoder))
}
