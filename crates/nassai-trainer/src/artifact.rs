//! Artifact persistence.
//!
//! A trained model for `(mode, name)` lives at `{root}/{mode}_{name}.{ext}`,
//! where the extension is chosen by the model family, next to a JSON manifest
//! `{root}/{mode}_{name}.json` recording what is needed to reuse it: the
//! classifier kind, the label classes and the fitted feature pipeline.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use nassai_core::{FeaturePipeline, LabelEncoder, Mode, NassaiError, Result};
use serde::{Deserialize, Serialize};

use crate::model::{self, Classifier, ClassifierKind, ModelFamily, ModelRef};

/// Location of the artifact directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactConfig {
    pub root: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("models"),
        }
    }
}

impl ArtifactConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

/// Sidecar describing a persisted model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub name: String,
    pub mode: Mode,
    pub kind: ClassifierKind,
    pub family: ModelFamily,
    /// Label classes in index order.
    pub classes: Vec<String>,
    pub pipeline: FeaturePipeline,
    pub vector_size: usize,
    pub f1: f64,
    pub trained_at: DateTime<Utc>,
}

impl ArtifactManifest {
    pub fn encoder(&self) -> LabelEncoder {
        LabelEncoder::from_classes(self.classes.clone())
    }
}

/// A model reloaded from disk with its manifest.
pub struct LoadedModel {
    pub classifier: Box<dyn Classifier>,
    pub manifest: ArtifactManifest,
}

/// Saves and loads artifacts under one [`ArtifactConfig`] root.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    config: ArtifactConfig,
}

impl ArtifactStore {
    pub fn new(config: ArtifactConfig) -> Self {
        Self { config }
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    fn stem(mode: Mode, name: &str) -> String {
        format!("{mode}_{name}")
    }

    pub fn path_for(&self, mode: Mode, name: &str, family: ModelFamily) -> PathBuf {
        self.config
            .root
            .join(format!("{}.{}", Self::stem(mode, name), family.extension()))
    }

    pub fn manifest_path(&self, mode: Mode, name: &str) -> PathBuf {
        self.config
            .root
            .join(format!("{}.json", Self::stem(mode, name)))
    }

    /// Write the model and its manifest, replacing any previous artifact
    /// with the same mode and name.
    pub fn save(&self, classifier: &dyn Classifier, manifest: &ArtifactManifest) -> Result<PathBuf> {
        if classifier.kind() != manifest.kind {
            return Err(NassaiError::persistence(format!(
                "manifest describes {} but model is {}",
                manifest.kind,
                classifier.kind()
            )));
        }
        fs::create_dir_all(&self.config.root).map_err(|e| {
            NassaiError::persistence(format!(
                "cannot create {}: {e}",
                self.config.root.display()
            ))
        })?;

        let path = self.path_for(manifest.mode, &manifest.name, manifest.family);
        classifier.save(&path)?;

        let manifest_path = self.manifest_path(manifest.mode, &manifest.name);
        let file = File::create(&manifest_path).map_err(|e| {
            NassaiError::persistence(format!("cannot create {}: {e}", manifest_path.display()))
        })?;
        serde_json::to_writer_pretty(BufWriter::new(file), manifest)
            .map_err(|e| NassaiError::persistence(format!("write manifest: {e}")))?;

        tracing::info!(path = %path.display(), kind = %manifest.kind, "saved artifact");
        Ok(path)
    }

    pub fn read_manifest(&self, mode: Mode, name: &str) -> Result<ArtifactManifest> {
        let path = self.manifest_path(mode, name);
        let file = File::open(&path).map_err(|e| {
            NassaiError::persistence(format!("cannot open {}: {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| NassaiError::persistence(format!("{}: {e}", path.display())))
    }

    /// Reload the model saved for `(mode, name)` as an independent instance.
    pub fn load(&self, mode: Mode, name: &str) -> Result<LoadedModel> {
        let manifest = self.read_manifest(mode, name)?;
        let path = self.path_for(mode, name, manifest.family);
        let classifier = model::load(&path)?;
        if classifier.kind() != manifest.kind {
            return Err(NassaiError::persistence(format!(
                "{} holds {} but manifest says {}",
                path.display(),
                classifier.kind(),
                manifest.kind
            )));
        }
        Ok(LoadedModel {
            classifier,
            manifest,
        })
    }

    pub fn resolve(&self, mode: Mode, model: &ModelRef) -> Result<LoadedModel> {
        self.load(mode, model.name()?)
    }
}
