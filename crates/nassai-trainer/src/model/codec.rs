//! Estimator artifacts: bincode inside a gzip stream at maximum compression.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use nassai_core::{NassaiError, Result};
use serde::{Deserialize, Serialize};

use super::{BernoulliNb, Classifier, LinearSvm, LogisticRegression, MultinomialNb};

/// Tagged so a file can be loaded without knowing which estimator wrote it.
#[derive(Serialize, Deserialize)]
pub(crate) enum SavedEstimator {
    BernoulliNb(BernoulliNb),
    MultinomialNb(MultinomialNb),
    LinearSvm(LinearSvm),
    LogisticRegression(LogisticRegression),
}

impl SavedEstimator {
    fn into_classifier(self) -> Box<dyn Classifier> {
        match self {
            Self::BernoulliNb(m) => Box::new(m),
            Self::MultinomialNb(m) => Box::new(m),
            Self::LinearSvm(m) => Box::new(m),
            Self::LogisticRegression(m) => Box::new(m),
        }
    }
}

pub(crate) fn write_estimator(path: &Path, saved: &SavedEstimator) -> Result<()> {
    let file = File::create(path).map_err(|e| {
        NassaiError::persistence(format!("cannot create {}: {e}", path.display()))
    })?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::best());
    bincode::serialize_into(&mut encoder, saved)
        .map_err(|e| NassaiError::persistence(format!("encode {}: {e}", path.display())))?;
    encoder.finish()?.flush()?;
    tracing::debug!(path = %path.display(), "saved estimator");
    Ok(())
}

pub(crate) fn read_estimator(path: &Path) -> Result<Box<dyn Classifier>> {
    let file = File::open(path).map_err(|e| {
        NassaiError::persistence(format!("cannot open {}: {e}", path.display()))
    })?;
    let decoder = GzDecoder::new(BufReader::new(file));
    let saved: SavedEstimator = bincode::deserialize_from(decoder)
        .map_err(|e| NassaiError::persistence(format!("decode {}: {e}", path.display())))?;
    Ok(saved.into_classifier())
}
