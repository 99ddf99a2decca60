pub mod document;
pub mod matrix;
pub mod mode;
pub mod record;

pub use document::{tag_documents, Document, Split, TaggedDocument};
pub use matrix::FeatureMatrix;
pub use mode::{Backend, Mode};
pub use record::EvaluationRecord;
