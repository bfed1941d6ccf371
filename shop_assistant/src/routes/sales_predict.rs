use crate::{
    error::ApiError,
    sales::{AdvertisingInput, SalesPrediction},
    server::SharedState,
};
use axum::{extract::State, Json};
use std::time::Instant;
use tracing::instrument;

#[instrument(skip(state))]
pub async fn sales_predict(
    State(state): State<SharedState>,
    Json(input): Json<AdvertisingInput>,
) -> Result<Json<SalesPrediction>, ApiError> {
    state.metrics.record_request("/sales_predict");

    let started = Instant::now();
    let predicted_sales = state.sales_model.predict(input).await?;
    state
        .metrics
        .record_prediction_duration(started.elapsed().as_millis() as u64, "/sales_predict");

    tracing::debug!("Predicted sales {:.3}", predicted_sales);
    Ok(Json(SalesPrediction::new(input, predicted_sales)))
}
