use crate::embedding::DocumentEmbeddings;
use crate::error::Result;
use crate::types::{tag_documents, Document, FeatureMatrix, Split};

/// Fetch the precomputed vector of every document by its `{split}_{index}` tag.
///
/// Row `i` of the output is the vector stored under `split.tag(i)`. The vectors
/// must come from a model trained on exactly this corpus in this order; a
/// missing tag is reported, never zero-filled.
pub fn document_embedding(
    docs: &[Document],
    split: Split,
    model: &DocumentEmbeddings,
) -> Result<FeatureMatrix> {
    let dim = model.dim();
    let tagged = tag_documents(docs, split);
    let mut matrix = FeatureMatrix::zeros(tagged.len(), dim);

    for (i, doc) in tagged.iter().enumerate() {
        let vector = model.vector(&doc.tag)?;
        for (dst, &src) in matrix.row_mut(i).iter_mut().zip(vector) {
            *dst = src;
        }
    }

    Ok(matrix)
}
