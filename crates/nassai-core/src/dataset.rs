//! Labeled dataset loading and seeded train/validation/test splitting.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NassaiError, Result};
use crate::types::Document;

pub const DEFAULT_TEXT_COLUMN: &str = "text";
pub const DEFAULT_LABEL_COLUMN: &str = "label";

/// Documents with one string label each, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabeledDataset {
    pub documents: Vec<Document>,
    pub labels: Vec<String>,
}

impl LabeledDataset {
    pub fn new(documents: Vec<Document>, labels: Vec<String>) -> Result<Self> {
        if documents.len() != labels.len() {
            return Err(NassaiError::data(format!(
                "{} documents but {} labels",
                documents.len(),
                labels.len()
            )));
        }
        Ok(Self { documents, labels })
    }

    /// Read a CSV file with `text` and `label` header columns.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_csv_columns(path, DEFAULT_TEXT_COLUMN, DEFAULT_LABEL_COLUMN)
    }

    pub fn from_csv_columns<P: AsRef<Path>>(
        path: P,
        text_column: &str,
        label_column: &str,
    ) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)?;
        let dataset = Self::read(&mut reader, text_column, label_column)?;
        tracing::info!(path = %path.display(), rows = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    pub(crate) fn read<R: std::io::Read>(
        reader: &mut csv::Reader<R>,
        text_column: &str,
        label_column: &str,
    ) -> Result<Self> {
        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| NassaiError::data(format!("dataset has no {name:?} column")))
        };
        let text_idx = column(text_column)?;
        let label_idx = column(label_column)?;

        let mut documents = Vec::new();
        let mut labels = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let (Some(text), Some(label)) = (record.get(text_idx), record.get(label_idx)) else {
                return Err(NassaiError::data(format!("row {row} is missing a field")));
            };
            let label = label.trim();
            if label.is_empty() {
                return Err(NassaiError::data(format!("row {row} has an empty label")));
            }
            documents.push(Document::new(text));
            labels.push(label.to_string());
        }

        if documents.is_empty() {
            return Err(NassaiError::data("dataset has no rows"));
        }
        Ok(Self { documents, labels })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn tokens(&self) -> Vec<Vec<String>> {
        self.documents.iter().map(Document::tokens).collect()
    }

    /// Gather the given rows into a new dataset.
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            documents: indices.iter().map(|&i| self.documents[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
        }
    }
}

/// Partition proportions and shuffle seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Fraction of all rows held out for testing.
    pub test_size: f64,
    /// Fraction of the non-test rows held out for validation.
    pub validation_size: f64,
    pub seed: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            validation_size: 0.2,
            seed: 42,
        }
    }
}

impl SplitConfig {
    #[must_use]
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    #[must_use]
    pub fn with_validation_size(mut self, validation_size: f64) -> Self {
        self.validation_size = validation_size;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("test_size", self.test_size),
            ("validation_size", self.validation_size),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(NassaiError::data(format!(
                    "{name} must be in [0, 1), got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Row indices of each partition, in shuffled order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
    pub test: Vec<usize>,
}

/// Number of rows a fraction claims, rounded up.
fn held_out(n: usize, fraction: f64) -> usize {
    let raw = n as f64 * fraction;
    // Float noise: 0.1 * 30 is 3.0000000000000004.
    ((raw - 1e-9).ceil().max(0.0) as usize).min(n)
}

/// Shuffle `0..n` with the configured seed and cut it into test, validation
/// and train partitions (in that order).
pub fn split_indices(n: usize, config: &SplitConfig) -> Result<SplitIndices> {
    config.validate()?;

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = oorandom::Rand32::new(config.seed);
    for i in (1..indices.len()).rev() {
        let j = rng.rand_range(0..(i as u32 + 1)) as usize;
        indices.swap(i, j);
    }

    let n_test = held_out(n, config.test_size);
    let mut rest = indices.split_off(n_test);
    let test = indices;
    let n_val = held_out(rest.len(), config.validation_size);
    let train = rest.split_off(n_val);
    let validation = rest;

    tracing::debug!(
        train = train.len(),
        validation = validation.len(),
        test = test.len(),
        seed = config.seed,
        "dataset split"
    );

    Ok(SplitIndices {
        train,
        validation,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(csv_text: &str) -> Result<LabeledDataset> {
        let mut reader = csv::Reader::from_reader(csv_text.as_bytes());
        LabeledDataset::read(&mut reader, "text", "label")
    }

    #[test]
    fn test_correct_split_sizes() {
        let split = split_indices(100, &SplitConfig::default()).unwrap();
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.validation.len(), 16);
        assert_eq!(split.train.len(), 64);
    }

    #[test]
    fn test_all_items_preserved() {
        let split = split_indices(57, &SplitConfig::default()).unwrap();
        let mut all: Vec<usize> = split
            .train
            .iter()
            .chain(&split.validation)
            .chain(&split.test)
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..57).collect::<Vec<_>>());
    }

    #[test]
    fn test_same_seed_same_split() {
        let config = SplitConfig::default().with_seed(7);
        assert_eq!(
            split_indices(40, &config).unwrap(),
            split_indices(40, &config).unwrap()
        );
        let other = split_indices(40, &config.with_seed(8)).unwrap();
        assert_eq!(other.test.len(), 8);
    }

    #[test]
    fn test_sizes_round_up() {
        // 0.2 * 11 = 2.2 -> 3 test; 0.2 * 8 = 1.6 -> 2 validation
        let split = split_indices(11, &SplitConfig::default()).unwrap();
        assert_eq!(
            (split.test.len(), split.validation.len(), split.train.len()),
            (3, 2, 6)
        );
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let config = SplitConfig::default().with_test_size(1.5);
        assert!(matches!(
            split_indices(10, &config),
            Err(NassaiError::Data(_))
        ));
    }

    #[test]
    fn test_empty_dataset() {
        let split = split_indices(0, &SplitConfig::default()).unwrap();
        assert!(split.train.is_empty() && split.validation.is_empty() && split.test.is_empty());
    }

    #[test]
    fn reads_named_columns_in_any_order() {
        let ds = read_str("label,id,text\nsports,1,the match\npolitics,2,the vote\n").unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.documents[1].text, "the vote");
        assert_eq!(ds.labels, vec!["sports", "politics"]);
    }

    #[test]
    fn missing_column_is_data_error() {
        let err = read_str("body,label\nx,y\n").unwrap_err();
        assert!(matches!(err, NassaiError::Data(_)));
        assert!(err.to_string().contains("\"text\""));
    }

    #[test]
    fn empty_label_is_data_error() {
        assert!(matches!(
            read_str("text,label\nhello, \n"),
            Err(NassaiError::Data(_))
        ));
    }

    #[test]
    fn header_only_file_is_data_error() {
        assert!(matches!(read_str("text,label\n"), Err(NassaiError::Data(_))));
    }

    #[test]
    fn select_keeps_pairs_together() {
        let ds = read_str("text,label\na,x\nb,y\nc,z\n").unwrap();
        let picked = ds.select(&[2, 0]);
        assert_eq!(picked.documents[0].text, "c");
        assert_eq!(picked.labels, vec!["z", "x"]);
    }
}
