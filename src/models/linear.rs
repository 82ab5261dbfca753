//! JSON linear pipeline: standard scaling of numeric columns, one-hot
//! weights for categorical levels, logistic link.
//!
//! Artifact layout:
//!
//! ```json
//! {
//!   "name": "logreg-2024-06",
//!   "intercept": -0.84,
//!   "threshold": 0.45,
//!   "columns": [
//!     { "type": "numeric", "name": "lead_time", "mean": 85.2, "scale": 85.9, "weight": 1.31 },
//!     { "type": "categorical", "name": "market_segment_type",
//!       "levels": { "Online": 0.62, "Offline": -0.41 }, "handle_unknown": "error" }
//!   ]
//! }
//! ```

use crate::error::ModelError;
use crate::models::{ArtifactFormat, CancellationModel, ColumnKind, ModelColumn};
use crate::types::record::BookingRecord;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// What to do with a categorical level the pipeline was not fitted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownLevel {
    /// Reject the record with a schema mismatch
    #[default]
    Error,
    /// Treat the level as all-zero one-hot columns
    Ignore,
}

/// One preprocessing + coefficient entry of the pipeline
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LinearColumn {
    Numeric {
        name: String,
        #[serde(default)]
        mean: f64,
        #[serde(default = "default_scale")]
        scale: f64,
        weight: f64,
    },
    Categorical {
        name: String,
        levels: HashMap<String, f64>,
        #[serde(default)]
        handle_unknown: UnknownLevel,
    },
}

fn default_scale() -> f64 {
    1.0
}

impl LinearColumn {
    pub fn name(&self) -> &str {
        match self {
            LinearColumn::Numeric { name, .. } | LinearColumn::Categorical { name, .. } => name,
        }
    }

    fn kind(&self) -> ColumnKind {
        match self {
            LinearColumn::Numeric { .. } => ColumnKind::Numeric,
            LinearColumn::Categorical { .. } => ColumnKind::Categorical,
        }
    }

    /// Contribution of this column to the decision function
    fn contribution(&self, record: &BookingRecord) -> Result<f64, ModelError> {
        let value = record
            .get(self.name())
            .ok_or_else(|| ModelError::schema(format!("record has no field '{}'", self.name())))?;

        match self {
            LinearColumn::Numeric {
                name,
                mean,
                scale,
                weight,
            } => {
                let x = value.as_f64().ok_or_else(|| {
                    ModelError::schema(format!("field '{}' must be numeric, got '{}'", name, value))
                })?;
                Ok((x - mean) / scale * weight)
            }
            LinearColumn::Categorical {
                name,
                levels,
                handle_unknown,
            } => {
                let level = value.as_level().ok_or_else(|| {
                    ModelError::schema(format!("field '{}' must be categorical, got {}", name, value))
                })?;
                match (levels.get(level), handle_unknown) {
                    (Some(weight), _) => Ok(*weight),
                    (None, UnknownLevel::Ignore) => Ok(0.0),
                    (None, UnknownLevel::Error) => Err(ModelError::schema(format!(
                        "unknown level '{}' for '{}'",
                        level, name
                    ))),
                }
            }
        }
    }
}

/// A fitted linear pipeline loaded from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct LinearPipeline {
    #[serde(default = "default_name")]
    pub name: String,
    pub intercept: f64,
    /// Decision threshold on the canceled-class probability, chosen at
    /// training time
    pub threshold: f64,
    pub columns: Vec<LinearColumn>,
}

fn default_name() -> String {
    "linear_pipeline".to_string()
}

impl LinearPipeline {
    /// Parse and validate a pipeline from JSON text
    pub fn from_json(json: &str) -> Result<Self, String> {
        let pipeline: LinearPipeline = serde_json::from_str(json).map_err(|e| e.to_string())?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Load a pipeline artifact from disk
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path).map_err(|source| ModelError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&json).map_err(|reason| ModelError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn validate(&self) -> Result<(), String> {
        if !self.intercept.is_finite() {
            return Err("intercept must be finite".to_string());
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(format!("threshold {} outside [0, 1]", self.threshold));
        }

        let mut names = HashSet::new();
        for column in &self.columns {
            if !names.insert(column.name()) {
                return Err(format!("column '{}' declared twice", column.name()));
            }
            match column {
                LinearColumn::Numeric {
                    name,
                    mean,
                    scale,
                    weight,
                } => {
                    if !(scale.is_finite() && *scale > 0.0) {
                        return Err(format!("column '{}' has non-positive scale", name));
                    }
                    if !(mean.is_finite() && weight.is_finite()) {
                        return Err(format!("column '{}' has non-finite coefficients", name));
                    }
                }
                LinearColumn::Categorical { name, levels, .. } => {
                    if levels.values().any(|w| !w.is_finite()) {
                        return Err(format!("column '{}' has non-finite level weights", name));
                    }
                }
            }
        }
        Ok(())
    }

    /// Probability of the canceled class
    fn canceled_probability(&self, record: &BookingRecord) -> Result<f64, ModelError> {
        let mut z = self.intercept;
        for column in &self.columns {
            z += column.contribution(record)?;
        }
        let p = 1.0 / (1.0 + (-z).exp());
        debug!(model = %self.name, decision = z, prob = p, "Linear pipeline evaluated");
        Ok(p)
    }
}

impl CancellationModel for LinearPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn format(&self) -> ArtifactFormat {
        ArtifactFormat::Json
    }

    fn input_columns(&self) -> Vec<ModelColumn> {
        self.columns
            .iter()
            .map(|column| ModelColumn::new(column.name(), column.kind()))
            .collect()
    }

    fn predict(&self, record: &BookingRecord) -> Result<i64, ModelError> {
        let p = self.canceled_probability(record)?;
        Ok(i64::from(p >= self.threshold))
    }

    fn predict_proba(&self, record: &BookingRecord) -> Result<[f64; 2], ModelError> {
        let p = self.canceled_probability(record)?;
        Ok([1.0 - p, p])
    }
}
