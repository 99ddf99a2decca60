use std::collections::HashMap;

use crate::error::{NassaiError, Result};

/// Token-level embedding table (word2vec / GloVe vectors).
///
/// Dimensionality is taken from the first vector inserted; an empty table has
/// dimension 0. Vectors of differing lengths are not checked here: callers
/// supply a uniform table.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    vectors: HashMap<String, Vec<f32>>,
    dim: usize,
}

impl EmbeddingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Vec<f32>)>,
    {
        let mut vectors = HashMap::new();
        let mut dim = None;
        for (key, vector) in entries {
            dim.get_or_insert(vector.len());
            vectors.insert(key.into(), vector);
        }
        Self {
            vectors,
            dim: dim.unwrap_or(0),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&[f32]> {
        self.vectors.get(key).map(Vec::as_slice)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.vectors.contains_key(key)
    }

    /// Fail unless the table is empty or has exactly `expected` dimensions.
    pub fn ensure_dim(&self, expected: usize) -> Result<()> {
        if !self.is_empty() && self.dim != expected {
            return Err(NassaiError::DimensionMismatch {
                expected,
                found: self.dim,
            });
        }
        Ok(())
    }
}

/// Document-level vectors produced by an externally trained doc2vec model,
/// keyed by document tag.
#[derive(Debug, Clone, Default)]
pub struct DocumentEmbeddings {
    table: EmbeddingTable,
}

impl DocumentEmbeddings {
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Vec<f32>)>,
    {
        Self {
            table: EmbeddingTable::from_entries(entries),
        }
    }

    pub fn dim(&self) -> usize {
        self.table.dim()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Vector stored for `tag`. Absent tags are an error, never a zero vector.
    pub fn vector(&self, tag: &str) -> Result<&[f32]> {
        self.table
            .get(tag)
            .ok_or_else(|| NassaiError::EmbeddingLookup {
                tag: tag.to_string(),
            })
    }

    pub fn ensure_dim(&self, expected: usize) -> Result<()> {
        self.table.ensure_dim(expected)
    }
}

impl From<EmbeddingTable> for DocumentEmbeddings {
    fn from(table: EmbeddingTable) -> Self {
        Self { table }
    }
}
