pub mod loader;
pub mod table;

pub use loader::{load_document_vectors, load_word_vectors};
pub use table::{DocumentEmbeddings, EmbeddingTable};
