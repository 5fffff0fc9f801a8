use axum::Json;
use serde_json::{Value, json};

pub mod attendance;
pub mod auth;
pub mod faces;
pub mod liveness;
pub mod subjects;
pub mod upload;

// 探活接口
pub async fn index() -> Json<Value> {
    Json(json!({
        "status": "success",
        "message": "Automatic Attendance System API is running!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
