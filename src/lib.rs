//! Ornament Classifier
//!
//! Serves ViT-B/16 predictions for 17 traditional Indian ornament categories.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  ORNAMENT CLASSIFIER                     │
//! ├──────────────────────────────────────────────────────────┤
//! │  POST /predict (multipart "file")                        │
//! │        │                                                 │
//! │        ▼  spawn_blocking                                 │
//! │  ┌──────────┐  ┌──────────────┐  ┌──────────────────┐    │
//! │  │ decode + │─▶│ ONNX Runtime │─▶│ softmax + argmax │    │
//! │  │ 224x224  │  │  ViT-B/16    │  │  + label table   │    │
//! │  └──────────┘  └──────────────┘  └──────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod model;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
use model::Predictor;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// `None` when the model failed to load at startup
    pub predictor: Option<Arc<Predictor>>,
    pub config: Config,
}

impl AppState {
    pub fn new(predictor: Option<Predictor>, config: Config) -> Self {
        Self {
            predictor: predictor.map(Arc::new),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/classes", get(handlers::classes::list))
        .route("/status", get(handlers::status::engine))
        .route(
            "/predict",
            post(handlers::predict::predict).layer(DefaultBodyLimit::max(body_limit)),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
