use axum::http::StatusCode;

pub mod publications;

// health check handler
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}
