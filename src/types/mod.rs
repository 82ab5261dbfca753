//! Type definitions for the cancellation predictor

pub mod booking;
pub mod prediction;
pub mod record;

pub use booking::{Categorical, MarketSegment, MealPlan, RawBooking, RoomType};
pub use prediction::{CancellationLabel, Prediction};
pub use record::{BookingRecord, FeatureKind, FeatureSpec, FeatureValue, FEATURE_SCHEMA};
