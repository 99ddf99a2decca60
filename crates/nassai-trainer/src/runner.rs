//! Run driver and results log.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use nassai_core::{
    Backend, EvaluationRecord, FeatureSources, Mode, NassaiError, Result, Vectorization,
};

use crate::catalog::check_combination;
use crate::config::TrainOptions;
use crate::model::Classifier;
use crate::trainer::train;

/// One named model to train in a batch.
pub struct RunEntry {
    pub name: String,
    pub vectorization: Vectorization,
    pub model: Box<dyn Classifier>,
}

impl RunEntry {
    pub fn new(
        name: impl Into<String>,
        vectorization: Vectorization,
        model: Box<dyn Classifier>,
    ) -> Self {
        Self {
            name: name.into(),
            vectorization,
            model,
        }
    }
}

/// Append-only CSV of [`EvaluationRecord`]s with a fixed header.
///
/// The header is written when the file is new or empty. Appending to a file
/// whose header differs is refused rather than producing misaligned rows.
#[derive(Debug, Clone)]
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `true` when the file already holds a header row.
    fn check_header(&self) -> Result<bool> {
        let has_content = self.path.metadata().map(|m| m.len() > 0).unwrap_or(false);
        if !has_content {
            return Ok(false);
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let headers = reader.headers()?;
        if !headers.iter().eq(EvaluationRecord::COLUMNS) {
            return Err(NassaiError::data(format!(
                "{} has header {:?}, expected {:?}",
                self.path.display(),
                headers.iter().collect::<Vec<_>>(),
                EvaluationRecord::COLUMNS
            )));
        }
        Ok(true)
    }

    pub fn append(&self, record: &EvaluationRecord) -> Result<()> {
        let has_header = self.check_header()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !has_header {
            writer.write_record(EvaluationRecord::COLUMNS)?;
        }
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    /// Every record in the log, oldest first.
    pub fn read_all(&self) -> Result<Vec<EvaluationRecord>> {
        let file = File::open(&self.path)?;
        let mut reader = csv::Reader::from_reader(file);
        reader
            .deserialize()
            .map(|row| row.map_err(NassaiError::from))
            .collect()
    }
}

/// Trains a list of models one after another and logs each result.
pub struct RunDriver<'a> {
    dataset: PathBuf,
    options: TrainOptions,
    sources: FeatureSources<'a>,
    using: Option<Backend>,
    log: ResultsLog,
}

impl<'a> RunDriver<'a> {
    pub fn new(dataset: impl Into<PathBuf>, options: TrainOptions, log: ResultsLog) -> Self {
        Self {
            dataset: dataset.into(),
            options,
            sources: FeatureSources::default(),
            using: None,
            log,
        }
    }

    #[must_use]
    pub fn with_sources(mut self, sources: FeatureSources<'a>) -> Self {
        self.sources = sources;
        self
    }

    #[must_use]
    pub fn with_using(mut self, using: Backend) -> Self {
        self.using = Some(using);
        self
    }

    pub fn log(&self) -> &ResultsLog {
        &self.log
    }

    /// Train every entry in order under `mode`. The first failure aborts the
    /// batch; records of runs completed before it are already in the log.
    pub fn run(&self, entries: Vec<RunEntry>, mode: Mode) -> Result<Vec<EvaluationRecord>> {
        tracing::info!(%mode, runs = entries.len(), "starting batch");
        let mut records = Vec::with_capacity(entries.len());

        for mut entry in entries {
            check_combination(mode, entry.vectorization)?;
            let options = self
                .options
                .clone()
                .with_mode(mode)
                .with_vectorization(entry.vectorization);

            let outcome = train(
                entry.model.as_mut(),
                &self.dataset,
                &entry.name,
                &options,
                &self.sources,
            )?;

            let record = EvaluationRecord::now(
                &entry.name,
                mode,
                self.using,
                outcome.score,
                outcome.duration_secs(),
            );
            self.log.append(&record)?;
            tracing::info!(
                model = %entry.name,
                f1 = record.f1,
                duration = record.duration,
                "logged run"
            );
            records.push(record);
        }

        Ok(records)
    }
}
