//! Predictor adapter: runs the loaded model on a derived record

use crate::error::ModelError;
use crate::feature_deriver::FeatureDeriver;
use crate::models::loader::SharedModel;
use crate::types::booking::RawBooking;
use crate::types::prediction::{CancellationLabel, Prediction};
use crate::types::record::BookingRecord;
use tracing::debug;

/// Result of one submit: the record sent to the model and its prediction
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: BookingRecord,
    pub prediction: Prediction,
}

/// Runs the shared model and checks its outputs
pub struct CancellationPredictor {
    /// Loaded model (read-only, shared)
    model: SharedModel,
    deriver: FeatureDeriver,
}

impl CancellationPredictor {
    pub fn new(model: SharedModel) -> Self {
        Self {
            model,
            deriver: FeatureDeriver::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn model(&self) -> &SharedModel {
        &self.model
    }

    /// Predict on an assembled record.
    ///
    /// The probability is the canceled-class mass from `predict_proba`; the
    /// label comes from the model's own `predict` and is never recomputed
    /// from the probability.
    pub fn predict(&self, record: &BookingRecord) -> Result<Prediction, ModelError> {
        let [_, canceled] = self.model.predict_proba(record)?;
        if !(0.0..=1.0).contains(&canceled) {
            return Err(ModelError::inference(format!(
                "{} returned probability {} outside [0, 1]",
                self.model.name(),
                canceled
            )));
        }

        let class = self.model.predict(record)?;
        let label = CancellationLabel::from_class(class).ok_or_else(|| {
            ModelError::inference(format!(
                "{} returned label {}, expected 0 or 1",
                self.model.name(),
                class
            ))
        })?;

        debug!(
            model = %self.model.name(),
            probability = canceled,
            label = ?label,
            "Prediction complete"
        );

        Ok(Prediction {
            label,
            probability: canceled,
        })
    }

    /// Derive the record from a raw booking and predict on it
    pub fn predict_booking(&self, booking: &RawBooking) -> Result<Submission, ModelError> {
        let record = self.deriver.derive(booking);
        debug!(record = ?record, "Features derived");
        let prediction = self.predict(&record)?;
        Ok(Submission { record, prediction })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::linear::{tests::fixture_json, LinearPipeline};
    use crate::models::{ArtifactFormat, CancellationModel, ModelColumn};
    use chrono::NaiveDate;
    use std::sync::Arc;

    /// Model with canned outputs
    struct FixedModel {
        proba: [f64; 2],
        class: i64,
    }

    impl CancellationModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn format(&self) -> ArtifactFormat {
            ArtifactFormat::Json
        }

        fn input_columns(&self) -> Vec<ModelColumn> {
            Vec::new()
        }

        fn predict(&self, _record: &BookingRecord) -> Result<i64, ModelError> {
            Ok(self.class)
        }

        fn predict_proba(&self, _record: &BookingRecord) -> Result<[f64; 2], ModelError> {
            Ok(self.proba)
        }
    }

    fn predictor(proba: [f64; 2], class: i64) -> CancellationPredictor {
        CancellationPredictor::new(Arc::new(FixedModel { proba, class }))
    }

    fn booking() -> RawBooking {
        RawBooking::new(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap())
    }

    #[test]
    fn test_label_is_not_recomputed() {
        // High probability, but the model decided "not canceled"
        let submission = predictor([0.1, 0.9], 0).predict_booking(&booking()).unwrap();
        assert_eq!(submission.prediction.label, CancellationLabel::NotCanceled);
        assert_eq!(submission.prediction.probability, 0.9);
    }

    #[test]
    fn test_probability_out_of_range() {
        let err = predictor([-0.2, 1.2], 1).predict_booking(&booking()).unwrap_err();
        assert!(matches!(err, ModelError::Inference(_)));
    }

    #[test]
    fn test_unexpected_label() {
        let err = predictor([0.5, 0.5], 3).predict_booking(&booking()).unwrap_err();
        assert!(err.to_string().contains("expected 0 or 1"));
    }

    #[test]
    fn test_fixture_pipeline_is_idempotent() {
        let model = LinearPipeline::from_json(fixture_json()).unwrap();
        let predictor = CancellationPredictor::new(Arc::new(model));

        let first = predictor.predict_booking(&booking()).unwrap();
        let second = predictor.predict_booking(&booking()).unwrap();

        assert_eq!(first.prediction, second.prediction);
        assert_eq!(first.record, second.record);
        assert!((0.0..=1.0).contains(&first.prediction.probability));
    }
}
