//! Error types for model loading and inference

use std::path::PathBuf;

/// Failures of the model loader and the predictor.
///
/// The artifact variants are fatal at startup; `SchemaMismatch` and
/// `Inference` are reported per request and leave the form usable.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact {}: {source}", .path.display())]
    ArtifactIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {} is corrupt: {reason}", .path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },

    #[error("unsupported model artifact {}: {reason}", .path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("inference failed: {0}")]
    Inference(String),
}

impl ModelError {
    pub fn schema(message: impl Into<String>) -> Self {
        ModelError::SchemaMismatch(message.into())
    }

    pub fn inference(message: impl Into<String>) -> Self {
        ModelError::Inference(message.into())
    }

    /// Stable short code used by the JSON API
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::ArtifactIo { .. } => "artifact_io",
            ModelError::ArtifactCorrupt { .. } => "artifact_corrupt",
            ModelError::UnsupportedFormat { .. } => "unsupported_format",
            ModelError::SchemaMismatch(_) => "schema_mismatch",
            ModelError::Inference(_) => "inference",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ModelError::schema("unknown level 'Room_Type 9' for room_type_reserved");
        assert_eq!(
            err.to_string(),
            "schema mismatch: unknown level 'Room_Type 9' for room_type_reserved"
        );
        assert_eq!(err.code(), "schema_mismatch");

        let err = ModelError::ArtifactIo {
            path: PathBuf::from("models/missing.onnx"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("models/missing.onnx"));
    }
}
