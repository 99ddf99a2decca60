//! TF-IDF vocabulary model.
//!
//! IDF uses the smoothed form `ln((1 + n) / (1 + df)) + 1`; rows are raw term
//! counts scaled by IDF and L2-normalised.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::FeatureMatrix;

/// A fitted TF-IDF model over a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Token -> column index. Columns follow lexicographic token order.
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f32>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and document frequencies from tokenized documents.
    pub fn fit(docs: &[Vec<String>]) -> Self {
        let mut df: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in docs {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for token in unique {
                *df.entry(token).or_insert(0) += 1;
            }
        }

        let n = docs.len() as f32;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(df.len());
        for (col, (token, count)) in df.into_iter().enumerate() {
            vocabulary.insert(token.to_string(), col);
            idf.push(((1.0 + n) / (1.0 + count as f32)).ln() + 1.0);
        }

        tracing::debug!(vocabulary = vocabulary.len(), docs = docs.len(), "fitted tf-idf");
        Self { vocabulary, idf }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    pub fn idf(&self, token: &str) -> Option<f32> {
        self.vocabulary.get(token).map(|&col| self.idf[col])
    }

    /// Project documents onto the fitted vocabulary. Unseen tokens are ignored.
    pub fn transform(&self, docs: &[Vec<String>]) -> FeatureMatrix {
        let mut matrix = FeatureMatrix::zeros(docs.len(), self.vocabulary_size());

        for (i, tokens) in docs.iter().enumerate() {
            let row = matrix.row_mut(i);
            for token in tokens {
                if let Some(&col) = self.vocabulary.get(token) {
                    row[col] += 1.0;
                }
            }
            for (v, idf) in row.iter_mut().zip(&self.idf) {
                *v *= idf;
            }
            let norm = row.iter().map(|v| v * v).sum::<f32>().sqrt();
            if norm > 0.0 {
                for v in row.iter_mut() {
                    *v /= norm;
                }
            }
        }

        matrix
    }

    /// Per-token IDF weights for weighted embedding pooling.
    pub fn weights(&self) -> TfidfWeights {
        let max_idf = self.idf.iter().copied().fold(0.0f32, f32::max);
        let idf = self
            .vocabulary
            .iter()
            .map(|(token, &col)| (token.clone(), self.idf[col]))
            .collect();
        TfidfWeights { idf, max_idf }
    }
}

/// Token weights used by TF-IDF-weighted embedding pooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfWeights {
    idf: HashMap<String, f32>,
    max_idf: f32,
}

impl TfidfWeights {
    /// Weight for `token`; tokens never seen during fitting get the maximum IDF.
    pub fn weight(&self, token: &str) -> f32 {
        self.idf.get(token).copied().unwrap_or(self.max_idf)
    }

    pub fn max_idf(&self) -> f32 {
        self.max_idf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn vocabulary_is_sorted_and_complete() {
        let tfidf = TfidfVectorizer::fit(&[toks("b a"), toks("c a")]);
        assert_eq!(tfidf.vocabulary_size(), 3);
        let cols: Vec<usize> = ["a", "b", "c"]
            .iter()
            .map(|t| tfidf.vocabulary[*t])
            .collect();
        assert_eq!(cols, vec![0, 1, 2]);
    }

    #[test]
    fn smoothed_idf_values() {
        let tfidf = TfidfVectorizer::fit(&[toks("a b"), toks("a")]);
        // a: df=2, n=2 -> ln(3/3)+1 = 1
        assert!((tfidf.idf("a").unwrap() - 1.0).abs() < 1e-6);
        // b: df=1 -> ln(3/2)+1
        assert!((tfidf.idf("b").unwrap() - (1.5f32.ln() + 1.0)).abs() < 1e-6);
        assert!(tfidf.idf("zzz").is_none());
    }

    #[test]
    fn rows_are_unit_length() {
        let tfidf = TfidfVectorizer::fit(&[toks("a b b"), toks("c")]);
        let m = tfidf.transform(&[toks("a b b"), toks("c c"), toks("unseen")]);
        assert_eq!(m.shape(), (3, 3));
        for row in m.iter_rows().take(2) {
            let norm: f32 = row.iter().map(|v| v * v).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
        assert!(m.row(2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn unseen_tokens_weigh_max_idf() {
        let weights = TfidfVectorizer::fit(&[toks("a b"), toks("a")]).weights();
        assert_eq!(weights.weight("never-seen"), weights.max_idf());
        assert!(weights.weight("a") < weights.max_idf());
    }
}
