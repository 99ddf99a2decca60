//! Feed-forward network classifier on candle.
//!
//! Hidden layers are `Linear -> ReLU -> Dropout`; the output layer produces
//! one logit per class and training minimises cross-entropy with AdamW.
//! Weights are saved as safetensors (`fc{i}` hidden layers, `out` output
//! layer) with the architecture stored as JSON in the header metadata, so a
//! saved network can be rebuilt from the file alone.

use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, Tensor, D};
use candle_nn::{linear, AdamW, Dropout, Linear, Module, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use nassai_core::{FeatureMatrix, NassaiError, Result};
use serde::{Deserialize, Serialize};

use super::{check_width, not_fitted, Classifier, ClassifierKind, Labeled};
use crate::config::NetworkParams;

const ARCHITECTURE_KEY: &str = "nassai.architecture";

/// Layer sizes, enough to rebuild the network before loading weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Architecture {
    input_dim: usize,
    hidden: Vec<usize>,
    num_classes: usize,
    params: NetworkParams,
}

struct Network {
    arch: Architecture,
    hidden: Vec<Linear>,
    output: Linear,
    dropout: Dropout,
}

impl Network {
    fn build(arch: Architecture, vb: &VarBuilder<'_>) -> candle_core::Result<Self> {
        let mut hidden = Vec::with_capacity(arch.hidden.len());
        let mut in_dim = arch.input_dim;
        for (i, &units) in arch.hidden.iter().enumerate() {
            hidden.push(linear(in_dim, units, vb.pp(format!("fc{i}")))?);
            in_dim = units;
        }
        let output = linear(in_dim, arch.num_classes, vb.pp("out"))?;
        let dropout = Dropout::new(arch.params.dropout);
        Ok(Self {
            arch,
            hidden,
            output,
            dropout,
        })
    }

    fn forward(&self, xs: &Tensor, train: bool) -> candle_core::Result<Tensor> {
        let mut h = xs.clone();
        for layer in &self.hidden {
            h = layer.forward(&h)?.relu()?;
            h = self.dropout.forward(&h, train)?;
        }
        self.output.forward(&h)
    }

    fn named_tensors(&self) -> Vec<(String, Tensor)> {
        let mut tensors = Vec::new();
        let layers = self
            .hidden
            .iter()
            .enumerate()
            .map(|(i, l)| (format!("fc{i}"), l))
            .chain(std::iter::once(("out".to_string(), &self.output)));
        for (name, layer) in layers {
            tensors.push((format!("{name}.weight"), layer.weight().clone()));
            if let Some(bias) = layer.bias() {
                tensors.push((format!("{name}.bias"), bias.clone()));
            }
        }
        tensors
    }
}

/// Multilayer perceptron over dense feature rows.
pub struct Mlp {
    params: NetworkParams,
    device: Device,
    network: Option<Network>,
}

impl Mlp {
    pub fn new(params: NetworkParams) -> Self {
        Self {
            params,
            device: Device::Cpu,
            network: None,
        }
    }

    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    /// Rebuild a saved network from its safetensors file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            NassaiError::persistence(format!("cannot open {}: {e}", path.display()))
        })?;
        let (_, metadata) = safetensors::SafeTensors::read_metadata(&bytes)
            .map_err(|e| NassaiError::persistence(format!("{}: {e}", path.display())))?;
        let raw = metadata
            .metadata()
            .as_ref()
            .and_then(|m| m.get(ARCHITECTURE_KEY))
            .ok_or_else(|| {
                NassaiError::persistence(format!("{} has no architecture metadata", path.display()))
            })?;
        let arch: Architecture = serde_json::from_str(raw)
            .map_err(|e| NassaiError::persistence(format!("bad architecture metadata: {e}")))?;

        let device = Device::Cpu;
        let vb = VarBuilder::from_buffered_safetensors(bytes, DType::F32, &device)?;
        let params = arch.params;
        let network = Network::build(arch, &vb)
            .map_err(|e| NassaiError::persistence(format!("{}: {e}", path.display())))?;

        Ok(Self {
            params,
            device,
            network: Some(network),
        })
    }

    fn check_params(&self) -> Result<()> {
        let p = &self.params;
        if p.batch == 0 || p.epochs == 0 || p.units == 0 {
            return Err(NassaiError::fit(
                "network needs positive batch, epochs and units",
            ));
        }
        if !(0.0..1.0).contains(&p.dropout) {
            return Err(NassaiError::fit(format!(
                "dropout must be in [0, 1), got {}",
                p.dropout
            )));
        }
        Ok(())
    }

    fn inputs(&self, features: &FeatureMatrix) -> Result<Tensor> {
        Ok(Tensor::from_slice(
            features.as_slice(),
            features.shape(),
            &self.device,
        )?)
    }

    fn targets(&self, labels: &[usize]) -> Result<Tensor> {
        let targets: Vec<u32> = labels.iter().map(|&i| i as u32).collect();
        Ok(Tensor::from_vec(targets, labels.len(), &self.device)?)
    }

    /// Loss and accuracy over a held-out set.
    fn evaluate(&self, network: &Network, data: &Labeled<'_>) -> Result<(f32, f64)> {
        let xs = self.inputs(data.features)?;
        let ys = self.targets(&data.labels.indices)?;
        let logits = network.forward(&xs, false)?;
        let loss = candle_nn::loss::cross_entropy(&logits, &ys)?.to_scalar::<f32>()?;
        let predictions = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
        let correct = predictions
            .iter()
            .zip(&data.labels.indices)
            .filter(|&(&p, &y)| p as usize == y)
            .count();
        Ok((loss, correct as f64 / data.rows() as f64))
    }
}

impl Classifier for Mlp {
    fn kind(&self) -> ClassifierKind {
        ClassifierKind::Mlp
    }

    fn fit(&mut self, train: Labeled<'_>, validation: Option<Labeled<'_>>) -> Result<()> {
        self.check_params()?;
        if train.rows() == 0 {
            return Err(NassaiError::data("empty training set"));
        }

        let arch = Architecture {
            input_dim: train.features.cols(),
            hidden: vec![self.params.units; self.params.layers],
            num_classes: train.labels.num_classes,
            params: self.params,
        };
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &self.device);
        let network = Network::build(arch, &vb)?;

        let mut optimizer = AdamW::new(
            varmap.all_vars(),
            ParamsAdamW {
                lr: self.params.learning_rate,
                ..Default::default()
            },
        )?;

        let xs = self.inputs(train.features)?;
        let ys = self.targets(&train.labels.indices)?;
        let mut rng = oorandom::Rand32::new(self.params.seed);
        let mut order: Vec<u32> = (0..train.rows() as u32).collect();
        let validation = validation.filter(|v| v.rows() > 0);

        for epoch in 0..self.params.epochs {
            for i in (1..order.len()).rev() {
                let j = rng.rand_range(0..(i as u32 + 1)) as usize;
                order.swap(i, j);
            }

            let mut epoch_loss = 0.0f32;
            let mut batches = 0usize;
            for chunk in order.chunks(self.params.batch) {
                let idx = Tensor::from_slice(chunk, chunk.len(), &self.device)?;
                let batch_x = xs.index_select(&idx, 0)?;
                let batch_y = ys.index_select(&idx, 0)?;
                let logits = network.forward(&batch_x, true)?;
                let loss = candle_nn::loss::cross_entropy(&logits, &batch_y)?;
                optimizer.backward_step(&loss)?;
                epoch_loss += loss.to_scalar::<f32>()?;
                batches += 1;
            }
            let train_loss = epoch_loss / batches.max(1) as f32;

            match &validation {
                Some(val) => {
                    let (val_loss, val_acc) = self.evaluate(&network, val)?;
                    tracing::debug!(epoch, train_loss, val_loss, val_acc, "mlp epoch");
                }
                None => tracing::debug!(epoch, train_loss, "mlp epoch"),
            }
        }

        self.network = Some(network);
        Ok(())
    }

    fn predict(&self, features: &FeatureMatrix) -> Result<Vec<usize>> {
        let network = self.network.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        check_width(network.arch.input_dim, features)?;
        if features.is_empty() {
            return Ok(Vec::new());
        }
        let logits = network.forward(&self.inputs(features)?, false)?;
        let predictions = logits.argmax(D::Minus1)?.to_vec1::<u32>()?;
        Ok(predictions.into_iter().map(|p| p as usize).collect())
    }

    fn num_classes(&self) -> usize {
        self.network.as_ref().map_or(0, |n| n.arch.num_classes)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let network = self.network.as_ref().ok_or_else(|| not_fitted(self.kind()))?;
        let arch = serde_json::to_string(&network.arch)
            .map_err(|e| NassaiError::persistence(format!("encode architecture: {e}")))?;
        let metadata = HashMap::from([(ARCHITECTURE_KEY.to_string(), arch)]);

        let tensors = network.named_tensors();
        safetensors::serialize_to_file(
            tensors.iter().map(|(name, t)| (name.as_str(), t)),
            &Some(metadata),
            path,
        )
        .map_err(|e| NassaiError::persistence(format!("write {}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), tensors = tensors.len(), "saved network");
        Ok(())
    }
}
