use crate::{
    config::ClassifierConfig,
    error::ModelError,
    session_pool::SessionPool,
    vision::{labels::LabelCatalog, preprocessing::ImageTensor},
};
use async_trait::async_trait;
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: String,
    /// Percentage in `[0, 100]`, one decimal place.
    pub probability: f64,
}

#[async_trait]
pub trait ImageClassifier: Send + Sync + 'static {
    async fn classify(&self, image: ImageTensor) -> Result<Vec<Prediction>, ModelError>;
}

pub struct OrtImageClassifier {
    pool: SessionPool,
    labels: LabelCatalog,
    top_k: usize,
}

impl OrtImageClassifier {
    pub fn new(pool: SessionPool, labels: LabelCatalog, top_k: usize) -> Self {
        Self {
            pool,
            labels,
            top_k,
        }
    }

    pub fn from_config(
        config: &ClassifierConfig,
        labels: LabelCatalog,
    ) -> Result<Self, ModelError> {
        let pool = SessionPool::new(&config.model)?;
        Ok(Self::new(pool, labels, config.top_k))
    }
}

#[async_trait]
impl ImageClassifier for OrtImageClassifier {
    async fn classify(&self, image: ImageTensor) -> Result<Vec<Prediction>, ModelError> {
        let outputs = self.pool.run_blocking(image.into_dyn()).await?;
        let scores = class_scores(&outputs, self.labels.len())?;
        Ok(top_k(&scores, self.top_k, &self.labels))
    }
}

/// Flattens a `[1, classes]` score tensor, rejecting any other shape and any
/// non-finite score.
pub fn class_scores(outputs: &ArrayD<f32>, label_count: usize) -> Result<Vec<f32>, ModelError> {
    let shape = outputs.shape();
    if shape.len() != 2 || shape[0] != 1 {
        return Err(ModelError::UnexpectedOutput(format!(
            "expected scores of shape [1, classes], got {:?}",
            shape
        )));
    }
    if shape[1] != label_count {
        tracing::warn!(
            "Model emits {} classes but {} labels are loaded",
            shape[1],
            label_count
        );
    }

    if let Some((index, score)) = outputs.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(ModelError::UnexpectedOutput(format!(
            "non-finite score {} for class {}",
            score, index
        )));
    }
    Ok(outputs.iter().copied().collect())
}

/// Ranks `scores` descending and keeps the first `k`.
pub fn top_k(scores: &[f32], k: usize, labels: &LabelCatalog) -> Vec<Prediction> {
    let mut ranked: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    // Stable sort keeps the lower class index first on ties.
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .take(k)
        .map(|(index, score)| Prediction {
            label: labels.label(index),
            probability: to_percentage(score),
        })
        .collect()
}

fn to_percentage(score: f32) -> f64 {
    let percentage = (score as f64 * 1000.).round() / 10.;
    percentage.clamp(0., 100.)
}
