mod chat;
mod classify;
mod home;
mod metrics;
mod sales_predict;

use crate::server::SharedState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        .route("/", get(home::home))
        .route("/hello", get(home::hello))
        .route("/health", get(home::healthcheck))
        .route("/metrics", get(metrics::metrics_handler))
        .route("/sales_predict", post(sales_predict::sales_predict))
        .route("/classify", post(classify::classify_image))
        .route("/ws", get(chat::chat_socket))
}

#[cfg(test)]
mod tests {
    use super::{classify::ClassifyResponse, *};
    use crate::{
        error::ModelError,
        sales::{AdvertisingInput, SalesModel},
        server::build_router,
        telemetry::Metrics,
        vision::{ImageClassifier, ImageTensor, Prediction},
    };
    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use image::{ImageBuffer, Rgb};
    use serde_json::{json, Value};
    use std::{io::Cursor, sync::Arc};
    use tower::ServiceExt;

    const BOUNDARY: &str = "shop-assistant-boundary";

    struct MockSalesModel {}

    #[async_trait]
    impl SalesModel for MockSalesModel {
        async fn predict(&self, input: AdvertisingInput) -> Result<f64, ModelError> {
            Ok(2.9 + 0.045 * input.tv + 0.19 * input.radio - 0.001 * input.newspaper)
        }
    }

    struct MockClassifier {}

    #[async_trait]
    impl ImageClassifier for MockClassifier {
        async fn classify(&self, image: ImageTensor) -> Result<Vec<Prediction>, ModelError> {
            assert_eq!(image.shape(), &[1, 224, 224, 3]);
            Ok(vec![
                Prediction {
                    label: "golden_retriever".to_string(),
                    probability: 81.3,
                },
                Prediction {
                    label: "Labrador_retriever".to_string(),
                    probability: 9.2,
                },
            ])
        }
    }

    struct FailingClassifier {}

    #[async_trait]
    impl ImageClassifier for FailingClassifier {
        async fn classify(&self, _image: ImageTensor) -> Result<Vec<Prediction>, ModelError> {
            Err(ModelError::UnexpectedOutput("boom".to_string()))
        }
    }

    fn app_with(classifier: Arc<dyn ImageClassifier>, max_upload_bytes: usize) -> Router {
        let state = SharedState {
            sales_model: Arc::new(MockSalesModel {}),
            classifier,
            metrics: Arc::new(Metrics::new().unwrap()),
        };
        build_router(state, max_upload_bytes)
    }

    fn app() -> Router {
        app_with(Arc::new(MockClassifier {}), 1024 * 1024)
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn png_bytes() -> Vec<u8> {
        let img = ImageBuffer::<Rgb<u8>, Vec<u8>>::from_pixel(64, 48, Rgb([200, 180, 40]));
        let mut image_data = Vec::new();
        img.write_to(&mut Cursor::new(&mut image_data), image::ImageFormat::Png)
            .unwrap();
        image_data
    }

    fn multipart_request(field_name: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"upload.png\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, field_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/classify")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn json_request(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_home_and_hello() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"message": "여기가 home입니다."}));

        let response = app()
            .oneshot(Request::get("/hello").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"greeting": "hello, world!"}));
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "Available"}));
    }

    #[tokio::test]
    async fn test_sales_predict_echoes_inputs() {
        let response = app()
            .oneshot(json_request(
                "/sales_predict",
                json!({"tv": 100.0, "radio": 20.0, "newspaper": 10.0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["tv"], 100.0);
        assert_eq!(body["radio"], 20.0);
        assert_eq!(body["newspaper"], 10.0);
        let predicted = body["predicted_sales"].as_f64().unwrap();
        assert!(predicted.is_finite());
        assert!((predicted - 11.19).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sales_predict_accepts_integers() {
        let response = app()
            .oneshot(json_request(
                "/sales_predict",
                json!({"tv": 0, "radio": 0, "newspaper": 0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_sales_predict_rejects_non_numeric() {
        let response = app()
            .oneshot(json_request(
                "/sales_predict",
                json!({"tv": "lots", "radio": 20.0, "newspaper": 10.0}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app()
            .oneshot(json_request("/sales_predict", json!({"tv": 1.0})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_classify_valid_image() {
        let response = app()
            .oneshot(multipart_request("file", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: ClassifyResponse =
            serde_json::from_value(body_json(response).await).unwrap();
        assert!(body.success);
        assert!(body.predictions.len() <= 5);
        assert_eq!(body.predictions[0].label, "golden_retriever");
        assert!(body
            .predictions
            .windows(2)
            .all(|w| w[0].probability >= w[1].probability));
        assert!(body
            .predictions
            .iter()
            .all(|p| (0.0..=100.0).contains(&p.probability)));
    }

    #[tokio::test]
    async fn test_classify_rejects_non_image() {
        let response = app()
            .oneshot(multipart_request("file", b"%PDF-1.4 not an image"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("decode"));
    }

    #[tokio::test]
    async fn test_classify_requires_file_field() {
        let response = app()
            .oneshot(multipart_request("picture", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_classify_rejects_oversized_upload() {
        let response = app_with(Arc::new(MockClassifier {}), 16 * 1024)
            .oneshot(multipart_request("file", &vec![0u8; 64 * 1024]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_classify_inference_failure() {
        let response = app_with(Arc::new(FailingClassifier {}), 1024 * 1024)
            .oneshot(multipart_request("file", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let response = app()
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
