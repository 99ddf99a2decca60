use thiserror::Error;

/// Errors that can occur while preparing data, training or persisting models.
#[derive(Debug, Error)]
pub enum NassaiError {
    /// Malformed or missing dataset rows, an empty label set, or mismatched
    /// feature/label row counts.
    #[error("data error: {0}")]
    Data(String),

    /// A document tag was not present in the document-embedding vocabulary.
    #[error("document embedding has no vector for tag {tag:?}")]
    EmbeddingLookup {
        /// The tag that could not be resolved.
        tag: String,
    },

    /// The underlying classifier refused to fit.
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Saving or loading a model artifact failed.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// The requested mode / classifier / backend combination is not supported.
    #[error("unsupported combination: {0}")]
    UnsupportedCombination(String),

    /// An embedding source does not have the configured dimensionality.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Configured vector size.
        expected: usize,
        /// Dimensionality reported by the embedding source.
        found: usize,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader/writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Candle ML framework error.
    #[error("tensor error: {0}")]
    Candle(#[from] candle_core::Error),
}

impl NassaiError {
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn fit(msg: impl Into<String>) -> Self {
        Self::ModelFit(msg.into())
    }

    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }
}

/// Result type alias for nassai operations.
pub type Result<T> = std::result::Result<T, NassaiError>;
