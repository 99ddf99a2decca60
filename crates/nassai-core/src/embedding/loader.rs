//! Readers for word2vec / GloVe style text vector files.
//!
//! Each line is `key v1 v2 ... vN`. A leading `count dim` line, as written by
//! word2vec and gensim, is detected and skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, info};

use super::table::{DocumentEmbeddings, EmbeddingTable};
use crate::error::{NassaiError, Result};

/// Load a token-level embedding table from a text vector file.
pub fn load_word_vectors<P: AsRef<Path>>(path: P) -> Result<EmbeddingTable> {
    let path = path.as_ref();
    let entries = read_vectors(path)?;
    let table = EmbeddingTable::from_entries(entries);
    info!(
        path = %path.display(),
        vectors = table.len(),
        dim = table.dim(),
        "loaded word vectors"
    );
    Ok(table)
}

/// Load tag-keyed document vectors from a text vector file.
pub fn load_document_vectors<P: AsRef<Path>>(path: P) -> Result<DocumentEmbeddings> {
    let path = path.as_ref();
    let entries = read_vectors(path)?;
    let docs = DocumentEmbeddings::from_entries(entries);
    info!(
        path = %path.display(),
        vectors = docs.len(),
        dim = docs.dim(),
        "loaded document vectors"
    );
    Ok(docs)
}

fn read_vectors(path: &Path) -> Result<Vec<(String, Vec<f32>)>> {
    let file = File::open(path).map_err(|e| {
        NassaiError::data(format!("cannot open vector file {}: {e}", path.display()))
    })?;
    parse_vectors(BufReader::new(file))
}

pub(crate) fn parse_vectors<R: BufRead>(reader: R) -> Result<Vec<(String, Vec<f32>)>> {
    let mut entries = Vec::new();
    let mut dim: Option<usize> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let Some(key) = parts.next() else { continue };
        let values: Vec<&str> = parts.collect();

        if line_no == 0 && is_header(key, &values) {
            debug!(header = line, "skipping vector file header");
            continue;
        }

        let vector = values
            .iter()
            .map(|v| v.parse::<f32>())
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| NassaiError::data(format!("line {}: bad value: {e}", line_no + 1)))?;

        match dim {
            None => dim = Some(vector.len()),
            Some(d) if d != vector.len() => {
                return Err(NassaiError::data(format!(
                    "line {}: vector for {key:?} has {} values, expected {d}",
                    line_no + 1,
                    vector.len()
                )));
            }
            Some(_) => {}
        }

        entries.push((key.to_string(), vector));
    }

    Ok(entries)
}

fn is_header(first: &str, rest: &[&str]) -> bool {
    rest.len() == 1 && first.parse::<usize>().is_ok() && rest[0].parse::<usize>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_headerless_glove_format() {
        let text = "the 0.1 0.2 0.3\ncat 1 2 3\n";
        let entries = parse_vectors(Cursor::new(text)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].0, "cat");
        assert_eq!(entries[1].1, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn skips_word2vec_header() {
        let text = "2 3\ntrain_0 1 0 0\ntrain_1 0 1 0\n";
        let entries = parse_vectors(Cursor::new(text)).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "train_0");
    }

    #[test]
    fn rejects_ragged_rows() {
        let text = "a 1 2\nb 1\n";
        let err = parse_vectors(Cursor::new(text)).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = parse_vectors(Cursor::new("a 1 x\n")).unwrap_err();
        assert!(matches!(err, NassaiError::Data(_)));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.txt");
        std::fs::write(&path, "a 1 1\nb 3 3\n").unwrap();
        let table = load_word_vectors(&path).unwrap();
        assert_eq!(table.dim(), 2);
        assert!(load_word_vectors(dir.path().join("missing.txt")).is_err());
    }
}
