use crate::db::postgres::postgres_service::PostgresService;
use crate::env_config::models::app_setting::AppSettings;
use crate::services::financial::FinancialService;
use crate::services::indices::IndexService;
use crate::services::news::NewsService;
use crate::services::stock::StockService;
use crate::services::stock_updates::StockUpdatesService;
use std::sync::Arc;

pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub postgres_service: Arc<PostgresService>,
    pub index_service: Arc<IndexService>,
    pub financial_service: Arc<FinancialService>,
    pub news_service: Arc<NewsService>,
    pub stock_service: Arc<StockService>,
    pub stock_updates_service: Arc<StockUpdatesService>,
}
