//! ONNX Runtime backend for exported preprocessing + estimator pipelines.
//!
//! The exported graph takes one `[1, 1]` input per record field (string
//! tensors for categorical columns) and produces a label tensor plus class
//! probabilities, either as a `[1, n_classes]` tensor or as ZipMap output
//! `seq(map(int64, float))`.

use crate::error::ModelError;
use crate::models::{ArtifactFormat, CancellationModel, ColumnKind, ModelColumn};
use crate::types::record::{BookingRecord, FeatureValue};
use anyhow::Context;
use ort::memory::Allocator;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::tensor::TensorElementType;
use ort::value::{
    DowncastableTarget, DynMapValueType, DynSequenceValueType, DynValue, Tensor, ValueType,
};
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing::{debug, info, warn};

static ORT_INIT: Once = Once::new();

/// A graph input and the element type it was exported with
#[derive(Debug, Clone)]
struct OnnxInput {
    name: String,
    element: TensorElementType,
    kind: ColumnKind,
}

/// Output data copied out of a session run
enum OwnedOutput {
    Labels(Vec<i64>),
    Probabilities { dims: Vec<i64>, data: Vec<f32> },
    ClassMap(Vec<(i64, f32)>),
}

/// Loaded ONNX pipeline with metadata
pub struct OnnxModel {
    /// Model name
    name: String,
    /// ONNX Runtime session; a run needs exclusive access
    session: Mutex<Session>,
    /// Graph inputs, one per record field
    inputs: Vec<OnnxInput>,
    /// Output holding the predicted class
    label_output: String,
    /// Output holding class probabilities
    probability_output: String,
}

impl OnnxModel {
    /// Load an ONNX pipeline from file
    pub fn load(path: &Path, name: &str, onnx_threads: usize) -> Result<Self, ModelError> {
        ORT_INIT.call_once(|| {
            if let Err(e) = ort::init().commit() {
                warn!(error = %e, "ONNX Runtime environment setup failed, using defaults");
            }
        });

        std::fs::metadata(path).map_err(|source| ModelError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        })?;

        info!(model = %name, path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = build_session(path, onnx_threads).map_err(|e| ModelError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason: format!("{:#}", e),
        })?;

        let mut inputs = Vec::with_capacity(session.inputs.len());
        for input in &session.inputs {
            let element = match &input.input_type {
                ValueType::Tensor { ty, .. } => *ty,
                _ => {
                    return Err(ModelError::ArtifactCorrupt {
                        path: path.to_path_buf(),
                        reason: format!("input '{}' is not a tensor", input.name),
                    })
                }
            };
            let kind = column_kind(element).ok_or_else(|| {
                ModelError::schema(format!(
                    "input '{}' has unsupported element type {:?}",
                    input.name, element
                ))
            })?;
            inputs.push(OnnxInput {
                name: input.name.clone(),
                element,
                kind,
            });
        }

        let output_names: Vec<&str> = session.outputs.iter().map(|o| o.name.as_str()).collect();
        let (label_output, probability_output) =
            pick_outputs(&output_names).map_err(|reason| ModelError::ArtifactCorrupt {
                path: path.to_path_buf(),
                reason,
            })?;

        info!(
            model = %name,
            inputs = inputs.len(),
            label = %label_output,
            probabilities = %probability_output,
            "Model loaded successfully"
        );

        Ok(Self {
            name: name.to_string(),
            session: Mutex::new(session),
            inputs,
            label_output,
            probability_output,
        })
    }

    /// Run the graph on a record and copy out a single named output
    fn run_session(&self, record: &BookingRecord, output_name: &str) -> Result<OwnedOutput, ModelError> {
        let mut inputs: Vec<(String, DynValue)> = Vec::with_capacity(self.inputs.len());
        for input in &self.inputs {
            let value = record.get(&input.name).ok_or_else(|| {
                ModelError::schema(format!("record has no field '{}'", input.name))
            })?;
            inputs.push((input.name.clone(), input_value(input, value)?));
        }

        let mut session = self
            .session
            .lock()
            .map_err(|e| ModelError::inference(format!("Lock error: {}", e)))?;

        let outputs = session
            .run(inputs)
            .map_err(|e| ModelError::inference(format!("{} run failed: {}", self.name, e)))?;

        let output = outputs.get(output_name).ok_or_else(|| {
            ModelError::inference(format!("{} produced no output '{}'", self.name, output_name))
        })?;

        if let Ok((_, labels)) = output.try_extract_tensor::<i64>() {
            return Ok(OwnedOutput::Labels(labels.to_vec()));
        }

        // Tensor format (zipmap disabled)
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(OwnedOutput::Probabilities {
                dims,
                data: data.to_vec(),
            });
        }

        // Sequence format (ZipMap) - seq(map(int64, float))
        let dtype = output.dtype();
        if DynSequenceValueType::can_downcast(&dtype) {
            return extract_class_map(output).map(OwnedOutput::ClassMap);
        }

        Err(ModelError::inference(format!(
            "output '{}' of {} has an unsupported type",
            output_name, self.name
        )))
    }
}

fn build_session(path: &Path, onnx_threads: usize) -> anyhow::Result<Session> {
    let session = Session::builder()?
        .with_optimization_level(GraphOptimizationLevel::Level3)?
        .with_intra_threads(onnx_threads)?
        .commit_from_file(path)
        .context(format!("Failed to load model from {:?}", path))?;
    Ok(session)
}

/// Build the `[1, 1]` input tensor for one record field
fn input_value(input: &OnnxInput, value: FeatureValue) -> Result<DynValue, ModelError> {
    let shape = vec![1_i64, 1];
    let mismatch = || {
        ModelError::schema(format!(
            "input '{}' expects {:?}, record has {} value '{}'",
            input.name,
            input.element,
            value.kind(),
            value
        ))
    };

    let tensor = match (input.element, value) {
        (TensorElementType::String, FeatureValue::Categorical(level)) => {
            Tensor::from_string_array((shape, &[level.to_string()][..])).map(|t| t.into_dyn())
        }
        (TensorElementType::Int64, FeatureValue::Integer(v)) => {
            Tensor::from_array((shape, vec![v])).map(|t| t.into_dyn())
        }
        (TensorElementType::Int32, FeatureValue::Integer(v)) => {
            let v = i32::try_from(v).map_err(|_| mismatch())?;
            Tensor::from_array((shape, vec![v])).map(|t| t.into_dyn())
        }
        (TensorElementType::Float32, FeatureValue::Integer(_) | FeatureValue::Decimal(_)) => {
            let v = value.as_f64().ok_or_else(mismatch)? as f32;
            Tensor::from_array((shape, vec![v])).map(|t| t.into_dyn())
        }
        (TensorElementType::Float64, FeatureValue::Integer(_) | FeatureValue::Decimal(_)) => {
            let v = value.as_f64().ok_or_else(mismatch)?;
            Tensor::from_array((shape, vec![v])).map(|t| t.into_dyn())
        }
        _ => return Err(mismatch()),
    };

    tensor.map_err(|e| {
        ModelError::inference(format!("failed to build input '{}': {}", input.name, e))
    })
}

/// Column kind a graph input element type can carry
fn column_kind(element: TensorElementType) -> Option<ColumnKind> {
    match element {
        TensorElementType::String => Some(ColumnKind::Categorical),
        TensorElementType::Int64
        | TensorElementType::Int32
        | TensorElementType::Float32
        | TensorElementType::Float64 => Some(ColumnKind::Numeric),
        _ => None,
    }
}

/// Choose the label and probability outputs of a graph by name.
///
/// The label is the first output named like a label, else the first output.
/// Probabilities never come from a label output, and a `prob` name wins over
/// a generic `output` name (sklearn-onnx exports `output_label` and
/// `output_probability`).
fn pick_outputs(names: &[&str]) -> Result<(String, String), String> {
    let label = names
        .iter()
        .copied()
        .find(|name| name.contains("label"))
        .or_else(|| names.first().copied())
        .ok_or_else(|| "graph has no outputs".to_string())?;

    let candidates: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| *name != label && !name.contains("label"))
        .collect();

    let probability = candidates
        .iter()
        .copied()
        .find(|name| name.contains("prob"))
        .or_else(|| candidates.iter().copied().find(|name| name.contains("output")))
        .or_else(|| candidates.last().copied())
        .ok_or_else(|| format!("graph has no probability output besides '{}'", label))?;

    Ok((label.to_string(), probability.to_string()))
}

/// Extract class probabilities from seq(map(int64, float)) format.
/// This is what sklearn-onnx emits with ZipMap enabled.
fn extract_class_map(output: &DynValue) -> Result<Vec<(i64, f32)>, ModelError> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| ModelError::inference(format!("Failed to downcast to sequence: {}", e)))?;

    let maps = sequence
        .try_extract_sequence::<DynMapValueType>(&allocator)
        .map_err(|e| ModelError::inference(e.to_string()))?;

    // batch_size is always 1
    let map_value = maps
        .first()
        .ok_or_else(|| ModelError::inference("Empty probability sequence"))?;

    map_value
        .try_extract_key_values::<i64, f32>()
        .map_err(|e| ModelError::inference(e.to_string()))
}

/// Canceled-class probability from a probability tensor
fn canceled_from_tensor(dims: &[i64], data: &[f32]) -> Option<f64> {
    let num_classes = dims.last().copied().unwrap_or(0);
    match num_classes {
        // [batch, n_classes] or [n_classes] - class 1 is canceled
        n if n >= 2 => data.get(1).map(|&p| p as f64),
        // single probability of the positive class
        1 => data.first().map(|&p| p as f64),
        _ => None,
    }
}

/// Canceled-class probability from a ZipMap entry
fn canceled_from_map(pairs: &[(i64, f32)]) -> Option<f64> {
    if let Some((_, p)) = pairs.iter().find(|(class, _)| *class == 1) {
        return Some(*p as f64);
    }
    pairs
        .iter()
        .find(|(class, _)| *class == 0)
        .map(|(_, p)| 1.0 - *p as f64)
}

impl CancellationModel for OnnxModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Onnx
    }

    fn input_columns(&self) -> Vec<ModelColumn> {
        self.inputs
            .iter()
            .map(|input| ModelColumn::new(input.name.clone(), input.kind))
            .collect()
    }

    fn predict(&self, record: &BookingRecord) -> Result<i64, ModelError> {
        match self.run_session(record, &self.label_output)? {
            OwnedOutput::Labels(labels) => labels
                .first()
                .copied()
                .ok_or_else(|| ModelError::inference("empty label output")),
            _ => Err(ModelError::inference(format!(
                "label output '{}' is not an int64 tensor",
                self.label_output
            ))),
        }
    }

    fn predict_proba(&self, record: &BookingRecord) -> Result<[f64; 2], ModelError> {
        let canceled = match self.run_session(record, &self.probability_output)? {
            OwnedOutput::Probabilities { dims, data } => canceled_from_tensor(&dims, &data),
            OwnedOutput::ClassMap(pairs) => canceled_from_map(&pairs),
            OwnedOutput::Labels(_) => None,
        }
        .ok_or_else(|| {
            ModelError::inference(format!(
                "could not read class probabilities from '{}'",
                self.probability_output
            ))
        })?;

        debug!(model = %self.name, prob = canceled, "Extracted canceled probability");
        Ok([1.0 - canceled, canceled])
    }
}
