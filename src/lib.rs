//! Hotel Booking Cancellation Predictor
//!
//! Serves a booking form, derives the engineered features a pre-trained
//! classifier was fitted on, and renders the predicted cancellation
//! probability and label.

pub mod config;
pub mod error;
pub mod feature_deriver;
pub mod form;
pub mod logging;
pub mod models;
pub mod page;
pub mod render;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::ModelError;
pub use feature_deriver::FeatureDeriver;
pub use form::BookingForm;
pub use models::inference::CancellationPredictor;
pub use server::{create_router, AppState};
pub use types::{booking::RawBooking, prediction::Prediction, record::BookingRecord};
