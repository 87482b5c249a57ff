mod error;
mod financial;
mod health;
mod index;
mod news;
mod stock;
mod views;
mod ws;

use crate::app_state::models::AppState;
use crate::layers::{create_cors, create_trace};
use axum::{Extension, Router, routing::get};
use std::sync::Arc;

/// JSON endpoints, mounted under `/api`
fn api_routes(app_state: &AppState) -> Router {
    let server = &app_state.settings.app_config.server;

    Router::new()
        .route("/index/all", get(index::get_all_indices))
        .route("/capital/total", get(financial::get_total_capital))
        .route("/market-cap", get(financial::get_market_cap))
        .route(
            "/financial/chart-data/{line_item_id}",
            get(financial::get_chart_data),
        )
        .route("/stocks", get(financial::get_stocks))
        .route("/report_types", get(financial::get_report_types))
        .route("/line_items", get(financial::get_line_items))
        .route("/financial_data", get(financial::get_financial_data))
        .route("/news", get(news::get_news_list))
        .route("/news/{news_id}", get(news::get_news_item))
        .route("/stock/transactions", get(stock::get_saved_transactions))
        .route_service("/information", views::information_page(&server.templates_dir))
}

/// Creates the application router with every endpoint and middleware
pub fn create_application_router(app_state: Arc<AppState>) -> Router {
    let server = &app_state.settings.app_config.server;
    let cors = create_cors(&server.allowed_origins);
    let views = views::view_routes(&server.templates_dir, &server.static_dir);

    Router::new()
        .route("/api-health", get(health::health_api))
        .route("/db-health", get(health::health_db))
        .route("/ws/stock-updates", get(ws::stock_updates_ws))
        .nest("/api", api_routes(&app_state))
        .merge(views)
        .layer(Extension(app_state.clone()))
        .layer(cors)
        .layer(create_trace())
}
