//! End-to-end tests of the form and JSON routes against the fixture pipeline

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use hotel_cancellation_predictor::models::{LinearPipeline, ModelLoader};
use hotel_cancellation_predictor::render::format_probability;
use hotel_cancellation_predictor::types::record::FEATURE_SCHEMA;
use hotel_cancellation_predictor::{create_router, AppState, CancellationPredictor};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/linear_pipeline.json");

const REFERENCE_FORM: &str = "no_of_adults=2&no_of_children=0&no_of_weekend_nights=1\
    &no_of_week_nights=2&type_of_meal_plan=Not+Selected&required_car_parking_space=0\
    &room_type_reserved=Room_Type+1&lead_time=100&arrival_date=2024-06-10\
    &market_segment_type=Online&no_of_previous_cancellations=0\
    &no_of_previous_bookings_not_canceled=1&avg_price_per_room=100.00&no_of_special_requests=0";

fn create_test_app() -> Router {
    let model = ModelLoader::new()
        .load_model(Path::new(FIXTURE))
        .expect("fixture model");
    create_router(AppState::new(CancellationPredictor::new(model)))
}

/// Fixture pipeline that only knows Room_Type 1
fn create_narrow_app() -> Router {
    let mut artifact: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(FIXTURE).expect("fixture")).expect("json");
    for column in artifact["columns"].as_array_mut().expect("columns") {
        if column["name"] == "room_type_reserved" {
            column["levels"] = serde_json::json!({ "Room_Type 1": 0.0 });
        }
    }
    let model = LinearPipeline::from_json(&artifact.to_string()).expect("narrow model");
    create_router(AppState::new(CancellationPredictor::new(Arc::new(model))))
}

async fn post_form(app: Router, body: &str) -> (StatusCode, String) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/predict")
                .header("content-type", "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, String::from_utf8(bytes.to_vec()).expect("utf8"))
}

async fn post_json(app: Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/predict")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

fn reference_json() -> serde_json::Value {
    serde_json::json!({
        "no_of_adults": 2,
        "no_of_children": 0,
        "no_of_weekend_nights": 1,
        "no_of_week_nights": 2,
        "type_of_meal_plan": "Not Selected",
        "required_car_parking_space": 0,
        "room_type_reserved": "Room_Type 1",
        "lead_time": 100,
        "arrival_date": "2024-06-10",
        "market_segment_type": "Online",
        "repeated_guest": false,
        "no_of_previous_cancellations": 0,
        "no_of_previous_bookings_not_canceled": 1,
        "avg_price_per_room": 100.0,
        "no_of_special_requests": 0
    })
}

#[tokio::test]
async fn test_index_shows_idle_form() {
    let response = create_test_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let page = String::from_utf8(bytes.to_vec()).expect("utf8");
    assert!(page.contains("<form method=\"post\" action=\"/predict\">"));
    assert!(!page.contains("Prediction Results"));
}

#[tokio::test]
async fn test_reference_booking_api() {
    let (status, body) = post_json(create_test_app(), reference_json()).await;
    assert_eq!(status, StatusCode::OK);

    let features = &body["features"];
    assert_eq!(features["total_nights"], 3);
    assert_eq!(features["total_guests"], 2);
    assert_eq!(features["arrival_month"], 6);
    assert_eq!(features["arrival_weekday"], 0);
    assert_eq!(features["repeated_guest"], 0);
    assert_eq!(features["type_of_meal_plan"], "Not Selected");

    let keys: HashSet<&str> = features
        .as_object()
        .expect("object")
        .keys()
        .map(String::as_str)
        .collect();
    let expected: HashSet<&str> = FEATURE_SCHEMA.iter().map(|spec| spec.name).collect();
    assert_eq!(keys, expected);

    let probability = body["probability"].as_f64().expect("probability");
    assert!((0.0..=1.0).contains(&probability));
    assert_eq!(body["probability_display"], format_probability(probability));

    let label = body["label"].as_str().expect("label");
    let short = body["verdict"]["short"].as_str().expect("verdict");
    match label {
        "not_canceled" => assert_eq!(short, "Not Canceled"),
        "canceled" => assert_eq!(short, "Canceled"),
        other => panic!("unexpected label {}", other),
    }
}

#[tokio::test]
async fn test_form_submit_renders_result() {
    let (_, api) = post_json(create_test_app(), reference_json()).await;
    let expected = api["probability_display"].as_str().expect("display").to_string();

    let (status, page) = post_form(create_test_app(), REFERENCE_FORM).await;
    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Prediction Results"));
    assert!(page.contains(&expected));
    assert!(page.contains("value=\"2024-06-10\""));
    assert!(page.contains("<option value=\"Not Selected\" selected>"));
}

#[tokio::test]
async fn test_resubmit_is_idempotent() {
    let (_, first) = post_json(create_test_app(), reference_json()).await;
    let (_, second) = post_json(create_test_app(), reference_json()).await;
    assert_eq!(first["probability"], second["probability"]);
    assert_eq!(first["label"], second["label"]);
}

#[tokio::test]
async fn test_out_of_domain_values_are_clamped() {
    let body = REFERENCE_FORM
        .replace("no_of_adults=2", "no_of_adults=11")
        .replace("lead_time=100", "lead_time=-4");
    let (status, page) = post_form(create_test_app(), &body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("name=\"no_of_adults\" min=\"0\" max=\"10\" step=\"1\" value=\"10\""));
    assert!(page.contains("name=\"lead_time\" min=\"0\" max=\"500\" step=\"1\" value=\"0\""));
}

#[tokio::test]
async fn test_boundary_values_accepted() {
    let mut booking = reference_json();
    booking["lead_time"] = 500.into();
    booking["avg_price_per_room"] = 10000.0.into();

    let (status, body) = post_json(create_test_app(), booking).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["features"]["lead_time"], 500);
    assert_eq!(body["features"]["avg_price_per_room"], 10000.0);
}

#[tokio::test]
async fn test_unknown_level_is_schema_mismatch() {
    let body = REFERENCE_FORM.replace("Room_Type+1", "Room_Type+7");
    let (status, page) = post_form(create_narrow_app(), &body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(page.contains("Prediction failed: schema mismatch"));
    assert!(page.contains("Room_Type 7"));
    // The form stays usable for a corrected retry
    assert!(page.contains("<form method=\"post\" action=\"/predict\">"));

    let mut booking = reference_json();
    booking["room_type_reserved"] = "Room_Type 7".into();
    let (status, body) = post_json(create_narrow_app(), booking).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "schema_mismatch");
}

#[tokio::test]
async fn test_unreachable_level_rejected_by_form() {
    let body = REFERENCE_FORM.replace("Room_Type+1", "Penthouse");
    let (status, page) = post_form(create_test_app(), &body).await;
    assert!(status.is_client_error());
    assert!(page.contains("Prediction failed: "));
    assert!(page.contains("<form method=\"post\" action=\"/predict\">"));
}

#[tokio::test]
async fn test_blank_fields_take_defaults() {
    let body = REFERENCE_FORM
        .replace("no_of_adults=2", "no_of_adults=")
        .replace("lead_time=100", "lead_time=")
        .replace("avg_price_per_room=100.00", "avg_price_per_room=");
    let (status, page) = post_form(create_test_app(), &body).await;

    assert_eq!(status, StatusCode::OK);
    assert!(page.contains("Prediction Results"));
    assert!(page.contains("name=\"no_of_adults\" min=\"0\" max=\"10\" step=\"1\" value=\"2\""));
    assert!(page.contains("name=\"lead_time\" min=\"0\" max=\"500\" step=\"1\" value=\"100\""));
    assert!(page.contains("value=\"100.00\""));
}

#[tokio::test]
async fn test_garbled_number_renders_failure() {
    let body = REFERENCE_FORM.replace("no_of_adults=2", "no_of_adults=two");
    let (status, page) = post_form(create_test_app(), &body).await;

    assert!(status.is_client_error());
    assert!(page.contains("Prediction failed: "));
    assert!(!page.contains("Prediction Results"));
}

#[tokio::test]
async fn test_health() {
    let response = create_test_app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let health: serde_json::Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["format"], "json");
}
