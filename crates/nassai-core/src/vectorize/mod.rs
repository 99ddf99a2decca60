//! # Vectorization
//!
//! Turns tokenized documents into fixed-width [`FeatureMatrix`] rows under one
//! of four strategies: TF-IDF over a learned vocabulary, mean word-embedding
//! pooling, TF-IDF-weighted embedding pooling, or document-embedding lookup.

pub mod doc2vec;
pub mod pooling;
pub mod tfidf;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use doc2vec::document_embedding;
pub use pooling::{mean_embedding, tfidf_embedding};
pub use tfidf::{TfidfVectorizer, TfidfWeights};

use crate::embedding::{DocumentEmbeddings, EmbeddingTable};
use crate::error::{NassaiError, Result};
use crate::types::FeatureMatrix;

/// Feature extraction strategy for a single run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Vectorization {
    /// Sparse TF-IDF over the training vocabulary (vocabulary-width rows).
    Tfidf,
    /// Mean of word vectors.
    MeanEmbedding,
    /// TF-IDF-weighted mean of word vectors.
    TfidfEmbedding,
    /// Precomputed document vectors looked up by tag.
    DocumentEmbedding,
}

impl Vectorization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tfidf => "tfidf",
            Self::MeanEmbedding => "mean_embedding",
            Self::TfidfEmbedding => "tfidf_embedding",
            Self::DocumentEmbedding => "document_embedding",
        }
    }

    pub fn needs_word_vectors(&self) -> bool {
        matches!(self, Self::MeanEmbedding | Self::TfidfEmbedding)
    }
}

impl fmt::Display for Vectorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Vectorization {
    type Err = NassaiError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tfidf" => Ok(Self::Tfidf),
            "mean_embedding" => Ok(Self::MeanEmbedding),
            "tfidf_embedding" | "tfidf_embedding_vectorizer" => Ok(Self::TfidfEmbedding),
            "document_embedding" => Ok(Self::DocumentEmbedding),
            other => Err(NassaiError::UnsupportedCombination(format!(
                "unknown vectorization {other:?}"
            ))),
        }
    }
}

/// Embedding sources available to a run. Loaded once by the caller and lent
/// to every run in a batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSources<'a> {
    pub word_vectors: Option<&'a EmbeddingTable>,
    pub document_vectors: Option<&'a DocumentEmbeddings>,
}

impl<'a> FeatureSources<'a> {
    pub fn word_vectors(&self) -> Result<&'a EmbeddingTable> {
        self.word_vectors.ok_or_else(|| {
            NassaiError::UnsupportedCombination("embedding pooling needs word vectors".into())
        })
    }

    pub fn document_vectors(&self) -> Result<&'a DocumentEmbeddings> {
        self.document_vectors.ok_or_else(|| {
            NassaiError::UnsupportedCombination(
                "document embedding lookup needs document vectors".into(),
            )
        })
    }
}

/// A text-to-features transform fitted on training documents.
///
/// Serialised next to trained models so a single string can be featurised
/// the same way at prediction time. Document-embedding lookup has no fitted
/// state and cannot featurise unseen text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeaturePipeline {
    Tfidf { model: TfidfVectorizer },
    MeanEmbedding,
    TfidfEmbedding { weights: TfidfWeights },
    DocumentEmbedding,
}

impl FeaturePipeline {
    /// Fit the chosen strategy on training token lists.
    pub fn fit(vectorization: Vectorization, train: &[Vec<String>]) -> Self {
        match vectorization {
            Vectorization::Tfidf => Self::Tfidf {
                model: TfidfVectorizer::fit(train),
            },
            Vectorization::MeanEmbedding => Self::MeanEmbedding,
            Vectorization::TfidfEmbedding => Self::TfidfEmbedding {
                weights: TfidfVectorizer::fit(train).weights(),
            },
            Vectorization::DocumentEmbedding => Self::DocumentEmbedding,
        }
    }

    pub fn vectorization(&self) -> Vectorization {
        match self {
            Self::Tfidf { .. } => Vectorization::Tfidf,
            Self::MeanEmbedding => Vectorization::MeanEmbedding,
            Self::TfidfEmbedding { .. } => Vectorization::TfidfEmbedding,
            Self::DocumentEmbedding => Vectorization::DocumentEmbedding,
        }
    }

    pub fn transform(
        &self,
        docs: &[Vec<String>],
        sources: &FeatureSources<'_>,
    ) -> Result<FeatureMatrix> {
        match self {
            Self::Tfidf { model } => Ok(model.transform(docs)),
            Self::MeanEmbedding => Ok(mean_embedding(docs, sources.word_vectors()?)),
            Self::TfidfEmbedding { weights } => {
                Ok(tfidf_embedding(docs, sources.word_vectors()?, weights))
            }
            Self::DocumentEmbedding => Err(NassaiError::UnsupportedCombination(
                "document vectors are looked up by tag and cannot featurise new text".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn vectorization_names_round_trip() {
        for v in [
            Vectorization::Tfidf,
            Vectorization::MeanEmbedding,
            Vectorization::TfidfEmbedding,
            Vectorization::DocumentEmbedding,
        ] {
            assert_eq!(v.as_str().parse::<Vectorization>().unwrap(), v);
        }
        assert_eq!(
            "tfidf_embedding_vectorizer".parse::<Vectorization>().unwrap(),
            Vectorization::TfidfEmbedding
        );
    }

    #[test]
    fn pooling_without_word_vectors_is_unsupported() {
        let pipeline = FeaturePipeline::fit(Vectorization::MeanEmbedding, &[toks("a")]);
        let err = pipeline
            .transform(&[toks("a")], &FeatureSources::default())
            .unwrap_err();
        assert!(matches!(err, NassaiError::UnsupportedCombination(_)));
    }

    #[test]
    fn tfidf_pipeline_width_is_vocabulary_size() {
        let train = vec![toks("a b"), toks("b c")];
        let pipeline = FeaturePipeline::fit(Vectorization::Tfidf, &train);
        let m = pipeline
            .transform(&[toks("a"), toks("d")], &FeatureSources::default())
            .unwrap();
        assert_eq!(m.shape(), (2, 3));
    }

    #[test]
    fn pipeline_survives_json() {
        let pipeline = FeaturePipeline::fit(Vectorization::TfidfEmbedding, &[toks("a b")]);
        let json = serde_json::to_string(&pipeline).unwrap();
        let back: FeaturePipeline = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pipeline);
        assert_eq!(back.vectorization(), Vectorization::TfidfEmbedding);
    }
}
