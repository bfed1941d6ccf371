use crate::{
    error::{ApiError, ModelError},
    server::SharedState,
    vision::{preprocess_image, ImageTensor, Prediction},
};
use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::instrument;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub success: bool,
    pub predictions: Vec<Prediction>,
}

#[instrument(skip(state, multipart))]
pub async fn classify_image(
    State(state): State<SharedState>,
    multipart: Multipart,
) -> Result<Json<ClassifyResponse>, ApiError> {
    state.metrics.record_request("/classify");

    let image_data = read_file_field(multipart).await?;
    tracing::debug!("Received image of {} bytes", image_data.len());

    let input = offload_decode(image_data).await?;

    let started = Instant::now();
    let predictions = state.classifier.classify(input).await?;
    state
        .metrics
        .record_prediction_duration(started.elapsed().as_millis() as u64, "/classify");

    for (i, prediction) in predictions.iter().enumerate() {
        tracing::debug!(
            "Prediction {}: label={}, probability={:.1}",
            i,
            prediction.label,
            prediction.probability
        );
    }

    Ok(Json(ClassifyResponse {
        success: true,
        predictions,
    }))
}

async fn read_file_field(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(FILE_FIELD) {
            return Ok(field.bytes().await?);
        }
    }

    Err(ApiError::InvalidUpload(format!(
        "missing `{}` field",
        FILE_FIELD
    )))
}

async fn offload_decode(image_data: Bytes) -> Result<ImageTensor, ApiError> {
    let decoded = tokio::task::spawn_blocking(move || preprocess_image(&image_data))
        .await
        .map_err(ModelError::from)?;
    Ok(decoded?)
}
