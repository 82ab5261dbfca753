//! The single HTML page: booking form plus results area

use crate::form::{
    DecimalField, IntField, ADULTS, AVG_PRICE, CHILDREN, LEAD_TIME, PARKING_SPACES,
    PREVIOUS_CANCELLATIONS, PREVIOUS_NOT_CANCELED, SPECIAL_REQUESTS, WEEKEND_NIGHTS, WEEK_NIGHTS,
};
use crate::render::RenderedResult;
use crate::types::booking::{Categorical, RawBooking};
use maud::{html, Markup, PreEscaped, DOCTYPE};

const STYLE: &str = "
body { font-family: system-ui, sans-serif; background: #fafafa; color: #262730; }
main { max-width: 46rem; margin: 2rem auto; padding: 0 1rem; }
form { display: grid; grid-template-columns: 1fr; gap: 0.35rem; }
label { font-size: 0.9rem; margin-top: 0.6rem; }
input, select { padding: 0.45rem; font-size: 1rem; border: 1px solid #d0d3da; border-radius: 0.4rem; }
.checkbox { display: flex; align-items: center; gap: 0.5rem; }
button { margin-top: 1.2rem; padding: 0.6rem; font-size: 1rem; border-radius: 0.4rem; cursor: pointer; }
.verdict { padding: 0.9rem 1rem; border-radius: 0.4rem; margin-top: 0.8rem; }
.verdict-error { background: #ffe4e4; color: #7d1a1a; }
.verdict-success { background: #dff5e3; color: #175a2a; }
";

/// What the results area shows
#[derive(Debug, Clone, Copy)]
pub enum ResultArea<'a> {
    /// No submit yet
    Idle,
    Shown(&'a RenderedResult),
    /// The submit failed; the message replaces the result
    Failed(&'a str),
}

/// Render the page with the form filled from `booking`
pub fn render_page(booking: &RawBooking, result: ResultArea<'_>) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { "Hotel Cancellation Predictor" }
                style { (PreEscaped(STYLE)) }
            }
            body {
                main {
                    h1 { "Hotel Booking Cancellation Predictor" }
                    p {
                        "Fill in the booking details below and click on "
                        strong { "Predict" }
                        " to see the probability of cancellation."
                    }
                    form method="post" action="/predict" {
                        (int_input(&ADULTS, booking.no_of_adults))
                        (int_input(&CHILDREN, booking.no_of_children))
                        (int_input(&WEEKEND_NIGHTS, booking.no_of_weekend_nights))
                        (int_input(&WEEK_NIGHTS, booking.no_of_week_nights))
                        (select_input("type_of_meal_plan", "Meal plan", booking.type_of_meal_plan))
                        (int_input(&PARKING_SPACES, booking.required_car_parking_space))
                        (select_input("room_type_reserved", "Room type reserved", booking.room_type_reserved))
                        (int_input(&LEAD_TIME, booking.lead_time))
                        label for="arrival_date" { "Arrival date" }
                        input type="date" id="arrival_date" name="arrival_date"
                            value=(booking.arrival_date.format("%Y-%m-%d").to_string()) required;
                        (select_input("market_segment_type", "Market segment", booking.market_segment_type))
                        label class="checkbox" {
                            input type="checkbox" name="repeated_guest" value="on"
                                checked[booking.repeated_guest];
                            "Repeated guest"
                        }
                        (int_input(&PREVIOUS_CANCELLATIONS, booking.no_of_previous_cancellations))
                        (int_input(&PREVIOUS_NOT_CANCELED, booking.no_of_previous_bookings_not_canceled))
                        (decimal_input(&AVG_PRICE, booking.avg_price_per_room))
                        (int_input(&SPECIAL_REQUESTS, booking.no_of_special_requests))
                        button type="submit" { "Predict" }
                    }
                    section id="result" {
                        @match result {
                            ResultArea::Idle => {}
                            ResultArea::Shown(rendered) => {
                                h2 { "Prediction Results" }
                                p {
                                    strong { "Cancellation Probability:" }
                                    " " (rendered.probability)
                                }
                                div class=(rendered.verdict.style.css_class()) {
                                    (rendered.verdict.message)
                                }
                            }
                            ResultArea::Failed(message) => {
                                div class="verdict verdict-error" role="alert" {
                                    "Prediction failed: " (message)
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn int_input(field: &IntField, value: u32) -> Markup {
    html! {
        label for=(field.name) { (field.label) }
        input type="number" id=(field.name) name=(field.name)
            min=(field.min) max=(field.max) step="1" value=(value) required;
    }
}

fn decimal_input(field: &DecimalField, value: f64) -> Markup {
    html! {
        label for=(field.name) { (field.label) }
        input type="number" id=(field.name) name=(field.name)
            min=(format!("{:.2}", field.min)) max=(format!("{:.2}", field.max)) step="0.01"
            value=(format!("{:.2}", value)) required;
    }
}

fn select_input<C: Categorical + PartialEq>(name: &str, label: &str, selected: C) -> Markup {
    html! {
        label for=(name) { (label) }
        select id=(name) name=(name) {
            @for level in C::ALL {
                option value=(level.label()) selected[*level == selected] { (level.label()) }
            }
        }
    }
}
