//! Raw booking attributes as collected from the booking form

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A categorical attribute with a fixed set of levels.
///
/// The labels are the exact level strings the classifier was fitted on.
pub trait Categorical: Copy + Sized + 'static {
    /// All levels, in the order the form presents them
    const ALL: &'static [Self];

    /// Wire label of this level
    fn label(self) -> &'static str;

    /// Look up a level by its wire label
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|level| level.label() == label)
    }
}

/// Meal plan booked with the room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MealPlan {
    #[default]
    #[serde(rename = "Meal Plan 1")]
    MealPlan1,
    #[serde(rename = "Not Selected")]
    NotSelected,
    #[serde(rename = "Meal Plan 2")]
    MealPlan2,
    #[serde(rename = "Meal Plan 3")]
    MealPlan3,
}

impl Categorical for MealPlan {
    const ALL: &'static [Self] = &[
        MealPlan::MealPlan1,
        MealPlan::NotSelected,
        MealPlan::MealPlan2,
        MealPlan::MealPlan3,
    ];

    fn label(self) -> &'static str {
        match self {
            MealPlan::MealPlan1 => "Meal Plan 1",
            MealPlan::NotSelected => "Not Selected",
            MealPlan::MealPlan2 => "Meal Plan 2",
            MealPlan::MealPlan3 => "Meal Plan 3",
        }
    }
}

/// Room type reserved (anonymised by the hotel chain as Room_Type 1..7)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomType {
    #[default]
    #[serde(rename = "Room_Type 1")]
    Type1,
    #[serde(rename = "Room_Type 2")]
    Type2,
    #[serde(rename = "Room_Type 3")]
    Type3,
    #[serde(rename = "Room_Type 4")]
    Type4,
    #[serde(rename = "Room_Type 5")]
    Type5,
    #[serde(rename = "Room_Type 6")]
    Type6,
    #[serde(rename = "Room_Type 7")]
    Type7,
}

impl Categorical for RoomType {
    const ALL: &'static [Self] = &[
        RoomType::Type1,
        RoomType::Type2,
        RoomType::Type3,
        RoomType::Type4,
        RoomType::Type5,
        RoomType::Type6,
        RoomType::Type7,
    ];

    fn label(self) -> &'static str {
        match self {
            RoomType::Type1 => "Room_Type 1",
            RoomType::Type2 => "Room_Type 2",
            RoomType::Type3 => "Room_Type 3",
            RoomType::Type4 => "Room_Type 4",
            RoomType::Type5 => "Room_Type 5",
            RoomType::Type6 => "Room_Type 6",
            RoomType::Type7 => "Room_Type 7",
        }
    }
}

/// Channel the booking came through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MarketSegment {
    #[default]
    Online,
    Offline,
    Corporate,
    Complementary,
    Aviation,
}

impl Categorical for MarketSegment {
    const ALL: &'static [Self] = &[
        MarketSegment::Online,
        MarketSegment::Offline,
        MarketSegment::Corporate,
        MarketSegment::Complementary,
        MarketSegment::Aviation,
    ];

    fn label(self) -> &'static str {
        match self {
            MarketSegment::Online => "Online",
            MarketSegment::Offline => "Offline",
            MarketSegment::Corporate => "Corporate",
            MarketSegment::Complementary => "Complementary",
            MarketSegment::Aviation => "Aviation",
        }
    }
}

/// Booking attributes exactly as the user entered them.
///
/// Values are already inside their declared domains; see
/// [`crate::form::BookingForm::collect`] for where that is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBooking {
    /// Number of adults (0-10)
    pub no_of_adults: u32,

    /// Number of children (0-10)
    pub no_of_children: u32,

    /// Saturday or Sunday nights (0-7)
    pub no_of_weekend_nights: u32,

    /// Monday to Friday nights (0-30)
    pub no_of_week_nights: u32,

    pub type_of_meal_plan: MealPlan,

    /// Parking spaces required (0-5)
    pub required_car_parking_space: u32,

    pub room_type_reserved: RoomType,

    /// Days between booking and arrival (0-500)
    pub lead_time: u32,

    /// Arrival date, taken as-is without timezone handling
    pub arrival_date: NaiveDate,

    pub market_segment_type: MarketSegment,

    pub repeated_guest: bool,

    /// Previous bookings the guest canceled (0-50)
    pub no_of_previous_cancellations: u32,

    /// Previous bookings the guest kept (0-50)
    pub no_of_previous_bookings_not_canceled: u32,

    /// Average nightly price (0.00-10000.00)
    pub avg_price_per_room: f64,

    /// Special requests made (0-10)
    pub no_of_special_requests: u32,
}

impl RawBooking {
    /// Create a booking with the form defaults for the given arrival date
    pub fn new(arrival_date: NaiveDate) -> Self {
        Self {
            no_of_adults: 2,
            no_of_children: 0,
            no_of_weekend_nights: 1,
            no_of_week_nights: 2,
            type_of_meal_plan: MealPlan::default(),
            required_car_parking_space: 0,
            room_type_reserved: RoomType::default(),
            lead_time: 100,
            arrival_date,
            market_segment_type: MarketSegment::default(),
            repeated_guest: false,
            no_of_previous_cancellations: 0,
            no_of_previous_bookings_not_canceled: 1,
            avg_price_per_room: 100.0,
            no_of_special_requests: 0,
        }
    }
}

impl Default for RawBooking {
    /// Form defaults, arriving today
    fn default() -> Self {
        Self::new(Local::now().date_naive())
    }
}
