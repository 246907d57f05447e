//! Image classification handler

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;

use crate::{AppError, AppResult, AppState};

/// Multipart field carrying the image
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: String,
    pub confidence: f32,
}

/// Classify an uploaded ornament image
pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<PredictResponse>> {
    let predictor = state.predictor.clone().ok_or(AppError::ModelNotLoaded)?;

    let mut multipart =
        multipart.map_err(|rejection| AppError::ValidationError(rejection.body_text()))?;
    let bytes = read_file_field(&mut multipart).await?;

    let upload_size = bytes.len();
    let classification = tokio::task::spawn_blocking(move || predictor.classify(&bytes))
        .await
        .map_err(|e| AppError::InternalError(format!("Inference task failed: {}", e)))??;

    tracing::info!(
        prediction = classification.label,
        confidence = classification.confidence,
        latency_us = classification.inference_time_us,
        upload_size,
        "Classified upload"
    );

    Ok(Json(PredictResponse {
        prediction: classification.label.to_string(),
        confidence: classification.confidence,
    }))
}

async fn read_file_field(multipart: &mut Multipart) -> AppResult<Vec<u8>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let bytes = field.bytes().await?;
        if bytes.is_empty() {
            return Err(AppError::ValidationError("Uploaded file is empty".to_string()));
        }
        return Ok(bytes.to_vec());
    }

    Err(AppError::ValidationError(format!(
        "No file uploaded (expected multipart field '{}')",
        FILE_FIELD
    )))
}
