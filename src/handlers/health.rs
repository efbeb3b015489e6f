use axum::Json;
use serde_json::{json, Value};

use super::response::ApiResponse;

pub async fn health() -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success("Service is running", json!({"status": "ok"})))
}
