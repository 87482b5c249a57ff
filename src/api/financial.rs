use super::error::ApiResult;
use crate::app_state::models::AppState;
use crate::db::postgres::models::financial::FinancialDataPoint;
use crate::services::financial::{CapitalTotal, Period};
use crate::services::financial::pivot::StatementRow;
use axum::{
    Json,
    extract::{Extension, Path, Query},
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CapitalQuery {
    pub year: Option<i32>,
    pub quarter: Option<String>,
    #[serde(rename = "lineItemId", alias = "line_item_id")]
    pub line_item_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LineItemsQuery {
    pub report_type_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct FinancialDataQuery {
    pub symbol: String,
    pub report_type_id: i64,
    pub period: Option<String>,
}

pub async fn get_total_capital(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<CapitalQuery>,
) -> ApiResult<Json<CapitalTotal>> {
    let service = &app_state.financial_service;
    let defaults = service.config();

    let year = query.year.unwrap_or(defaults.default_year);
    let quarter = query
        .quarter
        .unwrap_or_else(|| defaults.default_quarter.clone());
    let line_item_id = query.line_item_id.unwrap_or(defaults.default_line_item_id);

    info!(
        "Total capital requested: year={}, quarter={}, line_item_id={}",
        year, quarter, line_item_id
    );

    Ok(Json(service.total_capital(year, &quarter, line_item_id).await?))
}

pub async fn get_market_cap(
    Extension(app_state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Vec<FinancialDataPoint>>> {
    Ok(Json(app_state.financial_service.market_cap().await?))
}

pub async fn get_chart_data(
    Extension(app_state): Extension<Arc<AppState>>,
    Path(line_item_id): Path<i64>,
) -> ApiResult<Json<Vec<FinancialDataPoint>>> {
    Ok(Json(app_state.financial_service.chart_data(line_item_id).await?))
}

pub async fn get_stocks(
    Extension(app_state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(app_state.financial_service.stocks().await?))
}

pub async fn get_report_types(
    Extension(app_state): Extension<Arc<AppState>>,
) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(app_state.financial_service.report_types().await?))
}

pub async fn get_line_items(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<LineItemsQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    Ok(Json(
        app_state
            .financial_service
            .line_items(query.report_type_id)
            .await?,
    ))
}

pub async fn get_financial_data(
    Extension(app_state): Extension<Arc<AppState>>,
    Query(query): Query<FinancialDataQuery>,
) -> ApiResult<Json<Vec<StatementRow>>> {
    let period = match query.period.as_deref() {
        Some(raw) => raw.parse::<Period>()?,
        None => Period::default(),
    };

    Ok(Json(
        app_state
            .financial_service
            .financial_data(&query.symbol, query.report_type_id, period)
            .await?,
    ))
}
