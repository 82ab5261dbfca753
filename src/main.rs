//! Hotel Cancellation Predictor - Main Entry Point
//!
//! Loads the fitted pipeline once, then serves the booking form until
//! interrupted.

use anyhow::{Context, Result};
use hotel_cancellation_predictor::{
    config::AppConfig,
    create_router, logging,
    models::{inference::CancellationPredictor, loader, ModelLoader},
    AppState, FeatureDeriver,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging
    logging::init(&config.logging);

    info!("Starting Hotel Cancellation Predictor");
    info!(
        bind = %config.server.bind,
        model_path = %config.model.path.display(),
        onnx_threads = config.model.onnx_threads,
        "Configuration loaded successfully"
    );

    let deriver = FeatureDeriver::new();
    info!(
        "Feature deriver initialized ({} features)",
        deriver.feature_count()
    );

    // The model is required before anything is served
    let model_loader = ModelLoader::with_threads(config.model.onnx_threads);
    let model = match loader::shared_model(&model_loader, &config.model.path) {
        Ok(model) => model,
        Err(e) => {
            error!(error = %e, path = %config.model.path.display(), "Model artifact could not be loaded");
            return Err(e).context("Cannot serve predictions without a model");
        }
    };
    info!(model = %model.name(), format = %model.format(), "Model ready");

    let state = AppState::new(CancellationPredictor::new(model));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Serving booking form on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Predictor shutting down...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
