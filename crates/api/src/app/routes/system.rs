use axum::http::StatusCode;
use axum::response::Response;

use crate::app::dto;

pub async fn health() -> Response {
    dto::envelope(StatusCode::OK, "OK", serde_json::Value::Null)
}
