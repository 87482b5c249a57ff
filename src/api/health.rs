use crate::app_state::models::AppState;
use axum::{extract::Extension, http::StatusCode};
use std::sync::Arc;
use tracing::error;

pub async fn health_api() -> StatusCode {
    StatusCode::OK
}

pub async fn health_db(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<StatusCode, StatusCode> {
    match app_state.postgres_service.repository_health_check.check().await {
        Ok(true) => Ok(StatusCode::OK),
        Ok(false) => Err(StatusCode::INTERNAL_SERVER_ERROR),
        Err(e) => {
            error!("PostgreSQL health check failed: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
