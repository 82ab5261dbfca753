//! HTTP surface: the form page, its submit action and a JSON mirror

use crate::error::ModelError;
use crate::form::BookingForm;
use crate::models::inference::{CancellationPredictor, Submission};
use crate::page::{render_page, ResultArea};
use crate::render::{RenderedResult, Verdict};
use crate::types::booking::RawBooking;
use crate::types::prediction::CancellationLabel;
use crate::types::record::BookingRecord;
use axum::{
    extract::{rejection::FormRejection, Form, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub predictor: Arc<CancellationPredictor>,
}

impl AppState {
    pub fn new(predictor: CancellationPredictor) -> Self {
        Self {
            predictor: Arc::new(predictor),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(submit))
        .route("/api/predict", post(api_predict))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the collected booking through the predictor, logging the outcome
fn run_submission(predictor: &CancellationPredictor, booking: &RawBooking) -> Result<Submission, ModelError> {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("submit", %request_id);
    let _guard = span.enter();

    match predictor.predict_booking(booking) {
        Ok(submission) => {
            info!(
                probability = submission.prediction.probability,
                label = ?submission.prediction.label,
                total_nights = submission.record.total_nights,
                total_guests = submission.record.total_guests,
                "Prediction served"
            );
            Ok(submission)
        }
        Err(e) => {
            match &e {
                ModelError::SchemaMismatch(_) => warn!(error = %e, "Booking rejected by model"),
                _ => error!(error = %e, "Inference failed"),
            }
            Err(e)
        }
    }
}

fn status_for(error: &ModelError) -> StatusCode {
    match error {
        ModelError::SchemaMismatch(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// GET / - the form in its idle state
pub async fn index() -> Html<String> {
    Html(render_page(&RawBooking::default(), ResultArea::Idle).into_string())
}

/// POST /predict - form submit
pub async fn submit(
    State(state): State<AppState>,
    form: Result<Form<BookingForm>, FormRejection>,
) -> Response {
    let booking = match form {
        Ok(Form(form)) => form.collect(),
        Err(rejection) => {
            warn!(error = %rejection, "Unreadable booking form");
            let message = rejection.body_text();
            let page = render_page(&RawBooking::default(), ResultArea::Failed(&message));
            return (rejection.status(), Html(page.into_string())).into_response();
        }
    };

    match run_submission(&state.predictor, &booking) {
        Ok(submission) => {
            let rendered = RenderedResult::from(&submission.prediction);
            Html(render_page(&booking, ResultArea::Shown(&rendered)).into_string()).into_response()
        }
        Err(e) => {
            let message = e.to_string();
            let page = render_page(&booking, ResultArea::Failed(&message));
            (status_for(&e), Html(page.into_string())).into_response()
        }
    }
}

/// JSON prediction response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub probability: f64,
    pub probability_display: String,
    pub label: CancellationLabel,
    pub verdict: Verdict,
    pub features: BookingRecord,
}

/// JSON error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// POST /api/predict - same pipeline, JSON in and out
pub async fn api_predict(
    State(state): State<AppState>,
    Json(form): Json<BookingForm>,
) -> Result<Json<PredictResponse>, (StatusCode, Json<ErrorResponse>)> {
    let booking = form.collect();

    let submission = run_submission(&state.predictor, &booking).map_err(|e| {
        (
            status_for(&e),
            Json(ErrorResponse {
                error: e.to_string(),
                code: e.code().to_string(),
            }),
        )
    })?;

    let rendered = RenderedResult::from(&submission.prediction);
    Ok(Json(PredictResponse {
        probability: submission.prediction.probability,
        probability_display: rendered.probability,
        label: submission.prediction.label,
        verdict: rendered.verdict,
        features: submission.record,
    }))
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    pub format: String,
    pub version: String,
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model: state.predictor.model_name().to_string(),
        format: state.predictor.model().format().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
