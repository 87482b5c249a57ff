use crate::app_state::models::AppState;
use crate::services::indices::DisplayResult;
use axum::{Json, extract::Extension};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

/// Syncs every tracked index and returns its display summary keyed by symbol
pub async fn get_all_indices(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Json<BTreeMap<String, DisplayResult>> {
    let results = app_state.index_service.fetch_and_process_all_indices().await;
    info!("Returning data for {} market indices", results.len());
    Json(results)
}
