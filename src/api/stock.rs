use super::error::ApiResult;
use crate::app_state::models::AppState;
use crate::services::stock::PriceRow;
use axum::{
    Json,
    extract::{Extension, Query},
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct StockQuery {
    pub symbol: String,
}

pub async fn get_saved_transactions(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<StockQuery>,
) -> ApiResult<Json<Vec<PriceRow>>> {
    Ok(Json(
        app_state
            .stock_service
            .saved_transactions(&query.symbol)
            .await?,
    ))
}
