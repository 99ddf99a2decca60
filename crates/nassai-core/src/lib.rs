//! # Nassai Core
//!
//! Data plumbing for the nassai text-classification harness: labeled datasets
//! and seeded splits, embedding tables, the vectorization strategies that turn
//! token lists into fixed-width feature rows, label encoding and metrics.
//!
//! ## Quick Start
//!
//! ```rust
//! use nassai_core::{mean_embedding, EmbeddingTable};
//!
//! let table = EmbeddingTable::from_entries([("a", vec![1.0, 1.0]), ("b", vec![3.0, 3.0])]);
//! let docs = vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]];
//! let features = mean_embedding(&docs, &table);
//!
//! assert_eq!(features.row(0), &[2.0, 2.0]);
//! ```
pub mod dataset;
pub mod embedding;
pub mod error;
pub mod labels;
pub mod metrics;
pub mod types;
pub mod vectorize;

// Re-export primary API
pub use dataset::{split_indices, LabeledDataset, SplitConfig, SplitIndices};
pub use embedding::{load_document_vectors, load_word_vectors, DocumentEmbeddings, EmbeddingTable};
pub use error::{NassaiError, Result};
pub use labels::{encode, EncodedLabels, LabelEncoder};
pub use metrics::{compute_metrics, macro_f1, ClassMetrics, ClassificationMetrics};
pub use types::{
    tag_documents, Backend, Document, EvaluationRecord, FeatureMatrix, Mode, Split,
    TaggedDocument,
};
pub use vectorize::{
    document_embedding, mean_embedding, tfidf_embedding, FeaturePipeline, FeatureSources,
    TfidfVectorizer, TfidfWeights, Vectorization,
};
