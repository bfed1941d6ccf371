use axum::Json;
use serde_json::{json, Value};

pub async fn home() -> Json<Value> {
    Json(json!({ "message": "여기가 home입니다." }))
}

pub async fn hello() -> Json<Value> {
    Json(json!({ "greeting": "hello, world!" }))
}

pub async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "Available" }))
}
