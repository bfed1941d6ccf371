use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("session mutex poisoned: {0}")]
    Poisoned(String),
    #[error("invalid tensor shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
    #[error("inference task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum LabelsError {
    #[error("failed to read labels file: {0}")]
    Io(#[from] std::io::Error),
    #[error("blank label on line {0}")]
    BlankLine(usize),
    #[error("labels file is empty")]
    Empty,
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("failed to read image: {0}")]
    Read(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("failed to load sales model: {0}")]
    SalesModel(ModelError),
    #[error("failed to load classifier: {0}")]
    Classifier(ModelError),
    #[error("failed to load labels: {0}")]
    Labels(#[from] LabelsError),
    #[error("failed to initialize metrics: {0}")]
    Metrics(String),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid upload: {0}")]
    InvalidUpload(String),
    #[error("invalid upload: {}", .0.body_text())]
    Multipart(#[from] MultipartError),
    #[error("{0}")]
    UndecodableImage(#[from] ImageError),
    #[error("inference failed: {0}")]
    Inference(#[from] ModelError),
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidUpload(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::UndecodableImage(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
