//! Cancellation model loading and inference components

pub mod inference;
pub mod linear;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;

use crate::error::ModelError;
use crate::types::record::{feature_spec, BookingRecord, FeatureSpec, FEATURE_SCHEMA};
use std::collections::HashSet;
use std::fmt;

pub use inference::CancellationPredictor;
pub use linear::LinearPipeline;
pub use loader::{ModelCache, ModelLoader};

/// Serialization format of a model artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    /// ONNX export of the preprocessing + estimator pipeline
    Onnx,
    /// JSON linear pipeline
    Json,
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactFormat::Onnx => f.write_str("onnx"),
            ArtifactFormat::Json => f.write_str("json"),
        }
    }
}

/// How the model's preprocessing stage consumes an input column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

/// An input column declared by a loaded model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelColumn {
    pub name: String,
    pub kind: ColumnKind,
}

impl ModelColumn {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A pre-fitted classification pipeline.
///
/// Implementations are read-only after loading and are shared across request
/// handlers, hence `Send + Sync`.
pub trait CancellationModel: Send + Sync {
    /// Human readable model name
    fn name(&self) -> &str;

    fn format(&self) -> ArtifactFormat;

    /// Input columns the model's preprocessing stage expects
    fn input_columns(&self) -> Vec<ModelColumn>;

    /// Class index decided by the model's own decision rule
    fn predict(&self, record: &BookingRecord) -> Result<i64, ModelError>;

    /// Probability distribution over `[not canceled, canceled]`
    fn predict_proba(&self, record: &BookingRecord) -> Result<[f64; 2], ModelError>;
}

/// Check a model's declared inputs against [`FEATURE_SCHEMA`].
///
/// Names must match exactly (as a set) and every column must be consumable
/// with the kind of value the record carries for it.
pub fn check_schema(columns: &[ModelColumn]) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    let mut problems = Vec::new();

    for column in columns {
        if !seen.insert(column.name.as_str()) {
            problems.push(format!("duplicate input '{}'", column.name));
            continue;
        }
        match feature_spec(&column.name) {
            None => problems.push(format!("unexpected input '{}'", column.name)),
            Some(spec) if !kind_compatible(spec, column.kind) => problems.push(format!(
                "input '{}' is {:?} but the record field is {}",
                column.name, column.kind, spec.kind
            )),
            Some(_) => {}
        }
    }

    for spec in &FEATURE_SCHEMA {
        if !seen.contains(spec.name) {
            problems.push(format!("missing input '{}'", spec.name));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ModelError::schema(problems.join("; ")))
    }
}

fn kind_compatible(spec: &FeatureSpec, kind: ColumnKind) -> bool {
    match kind {
        ColumnKind::Numeric => spec.kind.is_numeric(),
        ColumnKind::Categorical => !spec.kind.is_numeric(),
    }
}
