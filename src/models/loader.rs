//! Model artifact loader and process-wide model cache

use crate::error::ModelError;
use crate::models::linear::LinearPipeline;
use crate::models::{check_schema, ArtifactFormat, CancellationModel};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};
use tracing::{debug, info};

/// A loaded model, shared read-only between request handlers
pub type SharedModel = Arc<dyn CancellationModel>;

/// Loader for model artifacts
#[derive(Debug, Clone)]
pub struct ModelLoader {
    /// Number of threads for ONNX inference
    onnx_threads: usize,
}

impl ModelLoader {
    /// Create a new model loader with default settings (1 thread)
    pub fn new() -> Self {
        Self::with_threads(1)
    }

    /// Create a new model loader with specified number of threads
    pub fn with_threads(onnx_threads: usize) -> Self {
        Self {
            onnx_threads: onnx_threads.max(1),
        }
    }

    /// Artifact format implied by the file extension
    pub fn detect_format(path: &Path) -> Result<ArtifactFormat, ModelError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("onnx") => Ok(ArtifactFormat::Onnx),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(ArtifactFormat::Json),
            _ => Err(ModelError::UnsupportedFormat {
                path: path.to_path_buf(),
                reason: "expected a .onnx or .json artifact".to_string(),
            }),
        }
    }

    /// Load a model artifact and check its inputs against the record schema
    pub fn load_model(&self, path: &Path) -> Result<SharedModel, ModelError> {
        let format = Self::detect_format(path)?;
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("model");

        info!(model = %name, path = %path.display(), format = %format, "Loading model artifact");

        let model: SharedModel = match format {
            ArtifactFormat::Json => Arc::new(LinearPipeline::load(path)?),
            ArtifactFormat::Onnx => self.load_onnx(path, name)?,
        };

        check_schema(&model.input_columns())?;

        info!(
            model = %model.name(),
            format = %model.format(),
            inputs = model.input_columns().len(),
            "Model schema verified"
        );

        Ok(model)
    }

    #[cfg(feature = "onnx")]
    fn load_onnx(&self, path: &Path, name: &str) -> Result<SharedModel, ModelError> {
        let model = crate::models::onnx::OnnxModel::load(path, name, self.onnx_threads)?;
        Ok(Arc::new(model))
    }

    #[cfg(not(feature = "onnx"))]
    fn load_onnx(&self, path: &Path, _name: &str) -> Result<SharedModel, ModelError> {
        Err(ModelError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: format!(
                "built without ONNX support ({} threads requested)",
                self.onnx_threads
            ),
        })
    }
}

impl Default for ModelLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Cache of loaded models keyed by artifact path.
///
/// The first request for a path reads the artifact; later requests get the
/// same instance back without touching the file.
#[derive(Default)]
pub struct ModelCache {
    entries: Mutex<HashMap<PathBuf, SharedModel>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached model for `path`, loading it on first use.
    /// Failed loads are not cached.
    pub fn get_or_load(&self, loader: &ModelLoader, path: &Path) -> Result<SharedModel, ModelError> {
        // Held across the load so concurrent first requests read the file once
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(model) = entries.get(path) {
            debug!(path = %path.display(), "Model served from cache");
            return Ok(Arc::clone(model));
        }

        let model = loader.load_model(path)?;
        entries.insert(path.to_path_buf(), Arc::clone(&model));
        Ok(model)
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

static SHARED_MODELS: LazyLock<ModelCache> = LazyLock::new(ModelCache::new);

/// Load a model through the process-wide cache
pub fn shared_model(loader: &ModelLoader, path: &Path) -> Result<SharedModel, ModelError> {
    SHARED_MODELS.get_or_load(loader, path)
}
