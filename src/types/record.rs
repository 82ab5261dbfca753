//! The feature record handed to the classifier, and its schema

use crate::types::booking::{Categorical, MarketSegment, MealPlan, RoomType};
use serde::Serialize;
use std::fmt;

/// Number of fields the classifier was fitted on
pub const FEATURE_COUNT: usize = 18;

/// Value kind of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Integer,
    Decimal,
    Categorical,
}

impl FeatureKind {
    pub fn is_numeric(self) -> bool {
        !matches!(self, FeatureKind::Categorical)
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureKind::Integer => f.write_str("integer"),
            FeatureKind::Decimal => f.write_str("decimal"),
            FeatureKind::Categorical => f.write_str("categorical"),
        }
    }
}

/// Name and kind of one record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
}

const fn spec(name: &'static str, kind: FeatureKind) -> FeatureSpec {
    FeatureSpec { name, kind }
}

/// Fields in the order of the training frame.
pub const FEATURE_SCHEMA: [FeatureSpec; FEATURE_COUNT] = [
    spec("no_of_adults", FeatureKind::Integer),
    spec("no_of_children", FeatureKind::Integer),
    spec("no_of_weekend_nights", FeatureKind::Integer),
    spec("no_of_week_nights", FeatureKind::Integer),
    spec("type_of_meal_plan", FeatureKind::Categorical),
    spec("required_car_parking_space", FeatureKind::Integer),
    spec("room_type_reserved", FeatureKind::Categorical),
    spec("lead_time", FeatureKind::Integer),
    spec("arrival_month", FeatureKind::Integer),
    spec("market_segment_type", FeatureKind::Categorical),
    spec("repeated_guest", FeatureKind::Integer),
    spec("no_of_previous_cancellations", FeatureKind::Integer),
    spec("no_of_previous_bookings_not_canceled", FeatureKind::Integer),
    spec("avg_price_per_room", FeatureKind::Decimal),
    spec("no_of_special_requests", FeatureKind::Integer),
    spec("total_nights", FeatureKind::Integer),
    spec("total_guests", FeatureKind::Integer),
    spec("arrival_weekday", FeatureKind::Integer),
];

/// Look up a field of the schema by name
pub fn feature_spec(name: &str) -> Option<&'static FeatureSpec> {
    FEATURE_SCHEMA.iter().find(|spec| spec.name == name)
}

/// A single typed field value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Integer(i64),
    Decimal(f64),
    Categorical(&'static str),
}

impl FeatureValue {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureValue::Integer(_) => FeatureKind::Integer,
            FeatureValue::Decimal(_) => FeatureKind::Decimal,
            FeatureValue::Categorical(_) => FeatureKind::Categorical,
        }
    }

    /// Numeric view of the value, `None` for categorical levels
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            FeatureValue::Integer(v) => Some(v as f64),
            FeatureValue::Decimal(v) => Some(v),
            FeatureValue::Categorical(_) => None,
        }
    }

    pub fn as_level(&self) -> Option<&'static str> {
        match *self {
            FeatureValue::Categorical(level) => Some(level),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Integer(v) => write!(f, "{}", v),
            FeatureValue::Decimal(v) => write!(f, "{:.2}", v),
            FeatureValue::Categorical(level) => f.write_str(level),
        }
    }
}

/// The 18-field record the classifier consumes.
///
/// Built by [`crate::feature_deriver::FeatureDeriver`]; never constructed from
/// user input directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRecord {
    pub no_of_adults: u32,
    pub no_of_children: u32,
    pub no_of_weekend_nights: u32,
    pub no_of_week_nights: u32,
    pub type_of_meal_plan: MealPlan,
    pub required_car_parking_space: u32,
    pub room_type_reserved: RoomType,
    pub lead_time: u32,
    pub arrival_month: u32,
    pub market_segment_type: MarketSegment,
    /// 1 for a repeated guest, 0 otherwise
    pub repeated_guest: u8,
    pub no_of_previous_cancellations: u32,
    pub no_of_previous_bookings_not_canceled: u32,
    pub avg_price_per_room: f64,
    pub no_of_special_requests: u32,
    pub total_nights: u32,
    pub total_guests: u32,
    /// Monday = 0 .. Sunday = 6
    pub arrival_weekday: u32,
}

impl BookingRecord {
    /// Field names and values, in [`FEATURE_SCHEMA`] order
    pub fn fields(&self) -> [(&'static str, FeatureValue); FEATURE_COUNT] {
        use FeatureValue::{Categorical, Decimal, Integer};

        [
            ("no_of_adults", Integer(self.no_of_adults.into())),
            ("no_of_children", Integer(self.no_of_children.into())),
            ("no_of_weekend_nights", Integer(self.no_of_weekend_nights.into())),
            ("no_of_week_nights", Integer(self.no_of_week_nights.into())),
            ("type_of_meal_plan", Categorical(self.type_of_meal_plan.label())),
            (
                "required_car_parking_space",
                Integer(self.required_car_parking_space.into()),
            ),
            ("room_type_reserved", Categorical(self.room_type_reserved.label())),
            ("lead_time", Integer(self.lead_time.into())),
            ("arrival_month", Integer(self.arrival_month.into())),
            ("market_segment_type", Categorical(self.market_segment_type.label())),
            ("repeated_guest", Integer(self.repeated_guest.into())),
            (
                "no_of_previous_cancellations",
                Integer(self.no_of_previous_cancellations.into()),
            ),
            (
                "no_of_previous_bookings_not_canceled",
                Integer(self.no_of_previous_bookings_not_canceled.into()),
            ),
            ("avg_price_per_room", Decimal(self.avg_price_per_room)),
            ("no_of_special_requests", Integer(self.no_of_special_requests.into())),
            ("total_nights", Integer(self.total_nights.into())),
            ("total_guests", Integer(self.total_guests.into())),
            ("arrival_weekday", Integer(self.arrival_weekday.into())),
        ]
    }

    /// Value of a single field by its model-facing name
    pub fn get(&self, name: &str) -> Option<FeatureValue> {
        self.fields()
            .into_iter()
            .find(|(field, _)| *field == name)
            .map(|(_, value)| value)
    }

    /// Field names, in [`FEATURE_SCHEMA`] order
    pub fn feature_names() -> Vec<&'static str> {
        FEATURE_SCHEMA.iter().map(|spec| spec.name).collect()
    }
}
