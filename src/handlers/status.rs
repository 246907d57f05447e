//! Inference engine status

use axum::{extract::State, Json};
use serde::Serialize;

use crate::model::{ModelMetadata, StatsSnapshot};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub metadata: Option<ModelMetadata>,
    pub inference_device: String,
    #[serde(flatten)]
    pub stats: StatsSnapshot,
}

pub async fn engine(State(state): State<AppState>) -> Json<EngineStatus> {
    let status = match state.predictor.as_deref() {
        Some(predictor) => EngineStatus {
            model_loaded: true,
            metadata: Some(predictor.metadata()),
            inference_device: format!("ONNX Runtime ({})", predictor.device()),
            stats: predictor.stats(),
        },
        None => EngineStatus {
            model_loaded: false,
            metadata: None,
            inference_device: "None".to_string(),
            stats: StatsSnapshot {
                inference_count: 0,
                failure_count: 0,
                avg_latency_ms: 0.0,
            },
        },
    };

    Json(status)
}
