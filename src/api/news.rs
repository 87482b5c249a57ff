use super::error::ApiResult;
use crate::app_state::models::AppState;
use axum::{
    Json,
    extract::{Extension, Path},
};
use serde_json::Value;
use std::sync::Arc;

pub async fn get_news_list(
    Extension(app_state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(app_state.news_service.all().await?))
}

pub async fn get_news_item(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(news_id): Path<i64>,
) -> ApiResult<Json<Value>> {
    Ok(Json(app_state.news_service.by_id(news_id).await?))
}
