//! Feature derivation for cancellation model inference.
//!
//! Turns the raw form values into the record the classifier was fitted on,
//! adding the engineered fields computed during training.

use crate::types::booking::RawBooking;
use crate::types::record::{BookingRecord, FEATURE_COUNT};
use chrono::Datelike;

/// Derives the classifier record from a raw booking.
///
/// Pure and deterministic: the same booking always yields the same record.
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Create a new feature deriver.
    pub fn new() -> Self {
        Self
    }

    /// Derive the 18-field record from a booking.
    ///
    /// `arrival_date` is dropped and replaced by `arrival_month` (1-12) and
    /// `arrival_weekday` (Monday = 0).
    pub fn derive(&self, booking: &RawBooking) -> BookingRecord {
        // Engineered features
        let total_nights = booking.no_of_weekend_nights + booking.no_of_week_nights;
        let total_guests = booking.no_of_adults + booking.no_of_children;
        let arrival_month = booking.arrival_date.month();
        let arrival_weekday = booking.arrival_date.weekday().num_days_from_monday();

        BookingRecord {
            no_of_adults: booking.no_of_adults,
            no_of_children: booking.no_of_children,
            no_of_weekend_nights: booking.no_of_weekend_nights,
            no_of_week_nights: booking.no_of_week_nights,
            type_of_meal_plan: booking.type_of_meal_plan,
            required_car_parking_space: booking.required_car_parking_space,
            room_type_reserved: booking.room_type_reserved,
            lead_time: booking.lead_time,
            arrival_month,
            market_segment_type: booking.market_segment_type,
            repeated_guest: u8::from(booking.repeated_guest),
            no_of_previous_cancellations: booking.no_of_previous_cancellations,
            no_of_previous_bookings_not_canceled: booking.no_of_previous_bookings_not_canceled,
            avg_price_per_room: booking.avg_price_per_room,
            no_of_special_requests: booking.no_of_special_requests,
            total_nights,
            total_guests,
            arrival_weekday,
        }
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    /// Get feature names (training frame order).
    pub fn feature_names(&self) -> Vec<&'static str> {
        BookingRecord::feature_names()
    }
}

impl Default for FeatureDeriver {
    fn default() -> Self {
        Self::new()
    }
}
