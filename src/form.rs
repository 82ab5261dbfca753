//! Booking form: field domains, defaults and collection of submitted values.
//!
//! Every numeric control carries its domain, and values received from a
//! submit are clamped into that domain. Nothing out of range ever reaches the
//! feature deriver.

use crate::types::booking::{MarketSegment, MealPlan, RawBooking, RoomType};
use chrono::{Local, NaiveDate};
use serde::{de, Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// An integer control with an inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntField {
    pub name: &'static str,
    pub label: &'static str,
    pub min: i64,
    pub max: i64,
    pub default: i64,
}

impl IntField {
    const fn new(name: &'static str, label: &'static str, max: i64, default: i64) -> Self {
        Self {
            name,
            label,
            min: 0,
            max,
            default,
        }
    }

    pub fn clamp(&self, value: i64) -> u32 {
        // All ranges start at 0 and end well inside u32.
        value.clamp(self.min, self.max) as u32
    }
}

/// A decimal control with an inclusive range and two-decimal step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecimalField {
    pub name: &'static str,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl DecimalField {
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }
}

pub const ADULTS: IntField = IntField::new("no_of_adults", "Number of adults", 10, 2);
pub const CHILDREN: IntField = IntField::new("no_of_children", "Number of children", 10, 0);
pub const WEEKEND_NIGHTS: IntField = IntField::new("no_of_weekend_nights", "Weekend nights", 7, 1);
pub const WEEK_NIGHTS: IntField = IntField::new("no_of_week_nights", "Week nights", 30, 2);
pub const PARKING_SPACES: IntField =
    IntField::new("required_car_parking_space", "Required parking spaces", 5, 0);
pub const LEAD_TIME: IntField = IntField::new("lead_time", "Lead time (days)", 500, 100);
pub const PREVIOUS_CANCELLATIONS: IntField = IntField::new(
    "no_of_previous_cancellations",
    "Previous cancellations",
    50,
    0,
);
pub const PREVIOUS_NOT_CANCELED: IntField = IntField::new(
    "no_of_previous_bookings_not_canceled",
    "Previous bookings not canceled",
    50,
    1,
);
pub const SPECIAL_REQUESTS: IntField =
    IntField::new("no_of_special_requests", "Number of special requests", 10, 0);

pub const AVG_PRICE: DecimalField = DecimalField {
    name: "avg_price_per_room",
    label: "Average price per room",
    min: 0.0,
    max: 10_000.0,
    default: 100.0,
};

/// Form submission as received over the wire.
///
/// Integers are accepted as `i64` so an out-of-range value is clamped rather
/// than rejected. Missing or blank fields take the form defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BookingForm {
    #[serde(deserialize_with = "deserialize_blank")]
    pub no_of_adults: Option<i64>,
    #[serde(deserialize_with = "deserialize_blank")]
    pub no_of_children: Option<i64>,
    #[serde(deserialize_with = "deserialize_blank")]
    pub no_of_weekend_nights: Option<i64>,
    #[serde(deserialize_with = "deserialize_blank")]
    pub no_of_week_nights: Option<i64>,
    pub type_of_meal_plan: MealPlan,
    #[serde(deserialize_with = "deserialize_blank")]
    pub required_car_parking_space: Option<i64>,
    pub room_type_reserved: RoomType,
    #[serde(deserialize_with = "deserialize_blank")]
    pub lead_time: Option<i64>,
    #[serde(deserialize_with = "deserialize_blank")]
    pub arrival_date: Option<NaiveDate>,
    pub market_segment_type: MarketSegment,
    #[serde(deserialize_with = "deserialize_checkbox")]
    pub repeated_guest: bool,
    #[serde(deserialize_with = "deserialize_blank")]
    pub no_of_previous_cancellations: Option<i64>,
    #[serde(deserialize_with = "deserialize_blank")]
    pub no_of_previous_bookings_not_canceled: Option<i64>,
    #[serde(deserialize_with = "deserialize_blank")]
    pub avg_price_per_room: Option<f64>,
    #[serde(deserialize_with = "deserialize_blank")]
    pub no_of_special_requests: Option<i64>,
}

impl BookingForm {
    /// Collect the submitted values into a booking, clamping each numeric
    /// field into its domain.
    pub fn collect(self) -> RawBooking {
        let int = |field: &IntField, value: Option<i64>| field.clamp(value.unwrap_or(field.default));

        RawBooking {
            no_of_adults: int(&ADULTS, self.no_of_adults),
            no_of_children: int(&CHILDREN, self.no_of_children),
            no_of_weekend_nights: int(&WEEKEND_NIGHTS, self.no_of_weekend_nights),
            no_of_week_nights: int(&WEEK_NIGHTS, self.no_of_week_nights),
            type_of_meal_plan: self.type_of_meal_plan,
            required_car_parking_space: int(&PARKING_SPACES, self.required_car_parking_space),
            room_type_reserved: self.room_type_reserved,
            lead_time: int(&LEAD_TIME, self.lead_time),
            arrival_date: self
                .arrival_date
                .unwrap_or_else(|| Local::now().date_naive()),
            market_segment_type: self.market_segment_type,
            repeated_guest: self.repeated_guest,
            no_of_previous_cancellations: int(
                &PREVIOUS_CANCELLATIONS,
                self.no_of_previous_cancellations,
            ),
            no_of_previous_bookings_not_canceled: int(
                &PREVIOUS_NOT_CANCELED,
                self.no_of_previous_bookings_not_canceled,
            ),
            avg_price_per_room: AVG_PRICE
                .clamp(self.avg_price_per_room.unwrap_or(AVG_PRICE.default)),
            no_of_special_requests: int(&SPECIAL_REQUESTS, self.no_of_special_requests),
        }
    }
}

/// Urlencoded forms send every value as text, and an emptied control sends
/// an empty string. Blank text and JSON `null` read as missing.
fn deserialize_blank<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field<T> {
        Value(T),
        Text(String),
        Null,
    }

    match Field::<T>::deserialize(deserializer)? {
        Field::Value(value) => Ok(Some(value)),
        Field::Text(text) if text.trim().is_empty() => Ok(None),
        Field::Text(text) => text.trim().parse().map(Some).map_err(de::Error::custom),
        Field::Null => Ok(None),
    }
}

/// HTML checkboxes post `on` when ticked and nothing otherwise; JSON clients
/// send a bool.
fn deserialize_checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Checkbox {
        Flag(bool),
        Text(String),
    }

    Ok(match Checkbox::deserialize(deserializer)? {
        Checkbox::Flag(flag) => flag,
        Checkbox::Text(text) => matches!(
            text.to_ascii_lowercase().as_str(),
            "on" | "true" | "1" | "yes"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_upper_bound() {
        let form = BookingForm {
            no_of_adults: Some(11),
            lead_time: Some(501),
            no_of_week_nights: Some(99),
            ..BookingForm::default()
        };

        let booking = form.collect();
        assert_eq!(booking.no_of_adults, 10);
        assert_eq!(booking.lead_time, 500);
        assert_eq!(booking.no_of_week_nights, 30);
    }

    #[test]
    fn test_clamp_lower_bound() {
        let form = BookingForm {
            no_of_children: Some(-3),
            avg_price_per_room: Some(-12.5),
            ..BookingForm::default()
        };

        let booking = form.collect();
        assert_eq!(booking.no_of_children, 0);
        assert_eq!(booking.avg_price_per_room, 0.0);
    }

    #[test]
    fn test_boundaries_accepted() {
        let form = BookingForm {
            lead_time: Some(500),
            avg_price_per_room: Some(10_000.0),
            ..BookingForm::default()
        };
        let booking = form.collect();
        assert_eq!(booking.lead_time, 500);
        assert_eq!(booking.avg_price_per_room, 10_000.0);

        let form = BookingForm {
            lead_time: Some(0),
            ..BookingForm::default()
        };
        assert_eq!(form.collect().lead_time, 0);
    }

    #[test]
    fn test_non_finite_price() {
        assert_eq!(AVG_PRICE.clamp(f64::NAN), 0.0);
        assert_eq!(AVG_PRICE.clamp(f64::INFINITY), 10_000.0);
    }

    #[test]
    fn test_json_defaults_and_checkbox() {
        let form: BookingForm = serde_json::from_str(
            r#"{"no_of_adults": 3, "repeated_guest": true, "room_type_reserved": "Room_Type 6"}"#,
        )
        .unwrap();
        assert_eq!(form.no_of_adults, Some(3));
        assert!(form.repeated_guest);
        assert_eq!(form.room_type_reserved, RoomType::Type6);
        assert_eq!(form.lead_time, None);
        assert_eq!(form.collect().lead_time, 100);

        let form: BookingForm = serde_json::from_str(r#"{"repeated_guest": "on"}"#).unwrap();
        assert!(form.repeated_guest);
    }

    #[test]
    fn test_blank_fields_take_defaults() {
        let form: BookingForm = serde_json::from_str(
            r#"{"no_of_adults": "", "lead_time": "  ", "arrival_date": "", "avg_price_per_room": null}"#,
        )
        .unwrap();
        assert_eq!(form.no_of_adults, None);
        assert_eq!(form.arrival_date, None);

        let booking = form.collect();
        assert_eq!(booking.no_of_adults, 2);
        assert_eq!(booking.lead_time, 100);
        assert_eq!(booking.avg_price_per_room, 100.0);
        assert_eq!(booking.arrival_date, Local::now().date_naive());
    }

    #[test]
    fn test_numbers_as_text() {
        let form: BookingForm = serde_json::from_str(
            r#"{"no_of_adults": "4", "avg_price_per_room": "89.90", "arrival_date": "2024-06-10"}"#,
        )
        .unwrap();
        assert_eq!(form.no_of_adults, Some(4));
        assert_eq!(form.avg_price_per_room, Some(89.9));
        assert_eq!(form.arrival_date, NaiveDate::from_ymd_opt(2024, 6, 10));

        assert!(serde_json::from_str::<BookingForm>(r#"{"lead_time": "soon"}"#).is_err());
    }

    #[test]
    fn test_unknown_level_rejected() {
        let result = serde_json::from_str::<BookingForm>(r#"{"type_of_meal_plan": "Meal Plan 9"}"#);
        assert!(result.is_err());
    }
}
