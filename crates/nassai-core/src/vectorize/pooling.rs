//! Token-embedding pooling: one fixed-size vector per document.
//!
//! Tokens missing from the table are skipped. A document with no known token
//! at all becomes the zero vector; that is "no signal", not a failure.

use super::tfidf::TfidfWeights;
use crate::embedding::EmbeddingTable;
use crate::types::FeatureMatrix;

/// Average the embedding vectors of each document's known tokens.
pub fn mean_embedding(docs: &[Vec<String>], table: &EmbeddingTable) -> FeatureMatrix {
    pool(docs, table, |_| 1.0)
}

/// Like [`mean_embedding`], but each token vector is scaled by its TF-IDF
/// weight before averaging. Tokens without a learned weight get the largest
/// IDF seen during fitting.
pub fn tfidf_embedding(
    docs: &[Vec<String>],
    table: &EmbeddingTable,
    weights: &TfidfWeights,
) -> FeatureMatrix {
    pool(docs, table, |token| weights.weight(token))
}

fn pool<F>(docs: &[Vec<String>], table: &EmbeddingTable, weight: F) -> FeatureMatrix
where
    F: Fn(&str) -> f32,
{
    let mut matrix = FeatureMatrix::zeros(docs.len(), table.dim());
    let mut unknown_docs = 0usize;

    for (i, tokens) in docs.iter().enumerate() {
        let row = matrix.row_mut(i);
        let mut count = 0usize;
        for token in tokens {
            if let Some(vector) = table.get(token) {
                let w = weight(token);
                for (acc, &v) in row.iter_mut().zip(vector) {
                    *acc += v * w;
                }
                count += 1;
            }
        }

        if count > 0 {
            let n = count as f32;
            for v in row.iter_mut() {
                *v /= n;
            }
        } else {
            unknown_docs += 1;
        }
    }

    if unknown_docs > 0 {
        tracing::warn!(
            unknown_docs,
            total = docs.len(),
            "documents without any known token pooled to zero vectors"
        );
    }

    matrix
}
