use crate::{config::ModelConfig, error::ModelError, session_pool::SessionPool};
use async_trait::async_trait;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Advertising spend per channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvertisingInput {
    pub tv: f64,
    pub radio: f64,
    pub newspaper: f64,
}

impl AdvertisingInput {
    /// Feature row in training column order: TV, Radio, Newspaper.
    pub fn features(&self) -> Array2<f32> {
        ndarray::arr2(&[[self.tv as f32, self.radio as f32, self.newspaper as f32]])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalesPrediction {
    pub tv: f64,
    pub radio: f64,
    pub newspaper: f64,
    pub predicted_sales: f64,
}

impl SalesPrediction {
    pub fn new(input: AdvertisingInput, predicted_sales: f64) -> Self {
        Self {
            tv: input.tv,
            radio: input.radio,
            newspaper: input.newspaper,
            predicted_sales,
        }
    }
}

#[async_trait]
pub trait SalesModel: Send + Sync + 'static {
    async fn predict(&self, input: AdvertisingInput) -> Result<f64, ModelError>;
}

pub struct OrtSalesModel {
    pool: SessionPool,
}

impl OrtSalesModel {
    pub fn new(model_config: &ModelConfig) -> Result<Self, ModelError> {
        let pool = SessionPool::new(model_config)?;
        match pool.producer() {
            Some(producer) => tracing::info!("Sales model loaded, produced by {}", producer),
            None => tracing::info!("Sales model loaded"),
        }
        Ok(Self { pool })
    }
}

#[async_trait]
impl SalesModel for OrtSalesModel {
    async fn predict(&self, input: AdvertisingInput) -> Result<f64, ModelError> {
        let outputs = self.pool.run_blocking(input.features().into_dyn()).await?;
        single_value(outputs.iter().copied())
    }
}

fn single_value(mut values: impl Iterator<Item = f32>) -> Result<f64, ModelError> {
    let value = values
        .next()
        .ok_or_else(|| ModelError::UnexpectedOutput("regressor returned no value".into()))?;
    if values.next().is_some() {
        return Err(ModelError::UnexpectedOutput(
            "regressor returned more than one value".into(),
        ));
    }
    if !value.is_finite() {
        return Err(ModelError::UnexpectedOutput(format!(
            "regressor returned non-finite value {}",
            value
        )));
    }
    Ok(value as f64)
}
