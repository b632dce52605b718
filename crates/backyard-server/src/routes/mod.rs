pub mod admin;
pub mod analysis;
pub mod submit;

use axum::Json;
use serde_json::{json, Value};

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "API is running",
    }))
}

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "It works!",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
