//! In-memory repositories and provider used by unit and router tests.

use crate::app_state::models::AppState;
use crate::db::postgres::models::financial::{
    FinancialDataPoint, FinancialReportRow, FinancialValueRow, LineItemRow, MarketCapRow,
};
use crate::db::postgres::models::index_history::{IndexHistoryRow, IndexTypeRow};
use crate::db::postgres::postgres_service::PostgresService;
use crate::db::postgres::repository::{
    financial_repository::TraitFinancialRepository,
    health_check_repository::TraitHealthCheckRepository, index_repository::TraitIndexRepository,
    news_repository::TraitNewsRepository, transaction_repository::TraitTransactionRepository,
};
use crate::env_config::models::app_config::{AppConfig, FinancialConfig, IndexConfig, TEST_CONFIG};
use crate::env_config::models::app_env::{AppEnv, Env};
use crate::env_config::models::app_setting::AppSettings;
use crate::services::financial::FinancialService;
use crate::services::indices::IndexService;
use crate::services::market_data::{
    FetchOutcome, OhlcvBar, PriceBoardEntry, ProviderError, TraitMarketDataProvider,
};
use crate::services::news::NewsService;
use crate::services::stock::StockService;
use crate::services::stock_updates::StockUpdatesService;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{Value, json};
use sqlx::Error as SqlxError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn bar(time: NaiveDate, close: Option<f64>) -> OhlcvBar {
    OhlcvBar {
        time,
        open: close,
        high: close,
        low: close,
        close,
        volume: Some(1_000),
    }
}

pub fn history_row(index_type_id: i64, time: NaiveDate, close: Option<f64>) -> IndexHistoryRow {
    IndexHistoryRow {
        index_type_id,
        time,
        open: close,
        high: close,
        low: close,
        close,
        volume: Some(1_000),
    }
}

pub fn index_config(symbol: &str, index_type: &str) -> IndexConfig {
    IndexConfig {
        symbol: symbol.to_string(),
        index_type: index_type.to_string(),
        source: "VCI".to_string(),
        table: "index_history".to_string(),
        default_start_date: date(2020, 1, 1),
    }
}

pub fn financial_config() -> FinancialConfig {
    FinancialConfig {
        default_line_item_id: 88,
        default_year: 2024,
        default_quarter: "Q4".to_string(),
        market_cap_min_stock_id: 1,
        market_cap_max_stock_id: 27,
        report_first_year: 2020,
        report_last_year: 2024,
    }
}

fn unavailable() -> SqlxError {
    SqlxError::PoolTimedOut
}

#[derive(Default)]
pub struct FakeIndexRepository {
    types: Vec<IndexTypeRow>,
    rows: Mutex<Vec<IndexHistoryRow>>,
    failing: AtomicBool,
    failing_series: Mutex<Vec<i64>>,
}

impl FakeIndexRepository {
    pub fn with_types(types: &[(i64, &str)]) -> Self {
        Self {
            types: types
                .iter()
                .map(|(id, index_type)| IndexTypeRow {
                    id: *id,
                    index_type: index_type.to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_rows(rows: Vec<IndexHistoryRow>) -> Self {
        let repo = Self::default();
        repo.insert_existing(rows);
        repo
    }

    pub fn insert_existing(&self, rows: Vec<IndexHistoryRow>) {
        self.rows.lock().unwrap().extend(rows);
    }

    pub fn stored_rows(&self) -> Vec<IndexHistoryRow> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.sort_by_key(|row| (row.index_type_id, row.time));
        rows
    }

    /// Every read fails from now on; inserts keep working.
    pub fn fail_reads(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Full-series reads fail for this index only.
    pub fn fail_series(&self, index_type_id: i64) {
        self.failing_series.lock().unwrap().push(index_type_id);
    }

    fn check(&self) -> Result<(), SqlxError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TraitIndexRepository for FakeIndexRepository {
    async fn get_index_types(&self) -> Result<Vec<IndexTypeRow>, SqlxError> {
        self.check()?;
        Ok(self.types.clone())
    }

    async fn get_latest_time(
        &self,
        _table: &str,
        index_type_id: i64,
    ) -> Result<Option<NaiveDate>, SqlxError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.index_type_id == index_type_id)
            .map(|row| row.time)
            .max())
    }

    async fn get_existing_times(
        &self,
        _table: &str,
        index_type_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, SqlxError> {
        self.check()?;
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.index_type_id == index_type_id && row.time >= from && row.time <= to)
            .map(|row| row.time)
            .collect())
    }

    async fn insert_rows(&self, _table: &str, rows: &[IndexHistoryRow]) -> Result<u64, SqlxError> {
        let mut stored = self.rows.lock().unwrap();
        let mut inserted = 0;
        for row in rows {
            let exists = stored
                .iter()
                .any(|s| s.index_type_id == row.index_type_id && s.time == row.time);
            if !exists {
                stored.push(row.clone());
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn get_all_rows(
        &self,
        _table: &str,
        index_type_id: i64,
    ) -> Result<Vec<IndexHistoryRow>, SqlxError> {
        self.check()?;
        if self.failing_series.lock().unwrap().contains(&index_type_id) {
            return Err(unavailable());
        }
        Ok(self
            .stored_rows()
            .into_iter()
            .filter(|row| row.index_type_id == index_type_id)
            .collect())
    }
}

pub struct FakeMarketDataProvider {
    history: FetchOutcome,
    board: Result<Vec<PriceBoardEntry>, String>,
    calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl FakeMarketDataProvider {
    pub fn with_history(history: FetchOutcome) -> Self {
        Self {
            history,
            board: Ok(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_board(board: Result<Vec<PriceBoardEntry>, ProviderError>) -> Self {
        Self {
            history: FetchOutcome::Empty,
            board: board.map_err(|e| match e {
                ProviderError::Api(message) => message,
                other => other.to_string(),
            }),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn history_calls(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TraitMarketDataProvider for FakeMarketDataProvider {
    async fn fetch_history(
        &self,
        symbol: &str,
        _source: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), start, end));
        self.history.clone()
    }

    async fn fetch_price_board(
        &self,
        _symbols: &[String],
    ) -> Result<Vec<PriceBoardEntry>, ProviderError> {
        self.board.clone().map_err(ProviderError::Api)
    }
}

#[derive(Default)]
pub struct FakeFinancialRepository {
    stocks: Mutex<Vec<(i64, String)>>,
    line_items: Mutex<Vec<(i64, LineItemRow)>>,
    // (stock_id, report_type_id, report)
    reports: Mutex<Vec<(i64, i64, FinancialReportRow)>>,
    values: Mutex<Vec<FinancialValueRow>>,
    market_cap: Mutex<Vec<MarketCapRow>>,
    chart: Mutex<Vec<FinancialDataPoint>>,
    failing: AtomicBool,
}

impl FakeFinancialRepository {
    pub fn add_stock(&self, stock_id: i64, symbol: &str) {
        self.stocks
            .lock()
            .unwrap()
            .push((stock_id, symbol.to_string()));
    }

    pub fn add_line_item(&self, report_type_id: i64, line_item_id: i64, name: &str) {
        self.line_items.lock().unwrap().push((
            report_type_id,
            LineItemRow {
                line_item_id,
                line_item_name: name.to_string(),
            },
        ));
    }

    pub fn add_report(
        &self,
        report_id: i64,
        stock_id: i64,
        report_type_id: i64,
        year: i32,
        quarter: Option<&str>,
    ) {
        self.reports.lock().unwrap().push((
            stock_id,
            report_type_id,
            FinancialReportRow {
                report_id,
                year,
                quarter: quarter.map(str::to_string),
            },
        ));
    }

    pub fn add_value(&self, report_id: i64, line_item_id: i64, value: Option<f64>) {
        self.values.lock().unwrap().push(FinancialValueRow {
            report_id,
            line_item_id,
            value,
        });
    }

    pub fn set_market_cap(&self, rows: Vec<MarketCapRow>) {
        *self.market_cap.lock().unwrap() = rows;
    }

    pub fn set_chart(&self, points: Vec<FinancialDataPoint>) {
        *self.chart.lock().unwrap() = points;
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), SqlxError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TraitFinancialRepository for FakeFinancialRepository {
    async fn get_stocks(&self) -> Result<Vec<Value>, SqlxError> {
        self.check()?;
        Ok(self
            .stocks
            .lock()
            .unwrap()
            .iter()
            .map(|(id, symbol)| json!({"stock_id": id, "symbol": symbol}))
            .collect())
    }

    async fn get_report_types(&self) -> Result<Vec<Value>, SqlxError> {
        self.check()?;
        Ok(vec![json!({"report_type_id": 1, "report_type_name": "Balance sheet"})])
    }

    async fn get_line_items_raw(&self, report_type_id: i64) -> Result<Vec<Value>, SqlxError> {
        Ok(self
            .get_line_items(report_type_id)
            .await?
            .into_iter()
            .map(|li| {
                json!({
                    "line_item_id": li.line_item_id,
                    "line_item_name": li.line_item_name,
                    "report_type_id": report_type_id,
                })
            })
            .collect())
    }

    async fn get_line_items(&self, report_type_id: i64) -> Result<Vec<LineItemRow>, SqlxError> {
        self.check()?;
        Ok(self
            .line_items
            .lock()
            .unwrap()
            .iter()
            .filter(|(rt, _)| *rt == report_type_id)
            .map(|(_, li)| li.clone())
            .collect())
    }

    async fn find_stock_id(&self, symbol: &str) -> Result<Option<i64>, SqlxError> {
        self.check()?;
        Ok(self
            .stocks
            .lock()
            .unwrap()
            .iter()
            .find(|(_, s)| s == symbol)
            .map(|(id, _)| *id))
    }

    async fn get_reports(
        &self,
        stock_id: i64,
        report_type_id: i64,
        first_year: i32,
        last_year: i32,
        quarterly: bool,
    ) -> Result<Vec<FinancialReportRow>, SqlxError> {
        self.check()?;
        let quarters = ["Q1", "Q2", "Q3", "Q4"];
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, rt, r)| {
                *s == stock_id
                    && *rt == report_type_id
                    && r.year >= first_year
                    && r.year <= last_year
                    && (!quarterly || r.quarter.as_deref().is_some_and(|q| quarters.contains(&q)))
            })
            .map(|(_, _, r)| r.clone())
            .collect())
    }

    async fn get_values_for_reports(
        &self,
        report_ids: &[i64],
    ) -> Result<Vec<FinancialValueRow>, SqlxError> {
        self.check()?;
        Ok(self
            .values
            .lock()
            .unwrap()
            .iter()
            .filter(|v| report_ids.contains(&v.report_id))
            .cloned()
            .collect())
    }

    async fn get_report_ids_for_period(
        &self,
        year: i32,
        quarter: &str,
    ) -> Result<Vec<i64>, SqlxError> {
        self.check()?;
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, _, r)| r.year == year && r.quarter.as_deref() == Some(quarter))
            .map(|(_, _, r)| r.report_id)
            .collect())
    }

    async fn get_line_item_values(
        &self,
        report_ids: &[i64],
        line_item_id: i64,
    ) -> Result<Vec<Option<f64>>, SqlxError> {
        self.check()?;
        Ok(self
            .values
            .lock()
            .unwrap()
            .iter()
            .filter(|v| report_ids.contains(&v.report_id) && v.line_item_id == line_item_id)
            .map(|v| v.value)
            .collect())
    }

    async fn get_market_cap_rows(
        &self,
        _line_item_id: i64,
        _year: i32,
        _quarter: &str,
        _min_stock_id: i64,
        _max_stock_id: i64,
    ) -> Result<Vec<MarketCapRow>, SqlxError> {
        self.check()?;
        Ok(self.market_cap.lock().unwrap().clone())
    }

    async fn get_chart_data(
        &self,
        _line_item_id: i64,
        _year: i32,
        _quarter: &str,
    ) -> Result<Vec<FinancialDataPoint>, SqlxError> {
        self.check()?;
        Ok(self.chart.lock().unwrap().clone())
    }
}

pub struct FakeNewsRepository {
    items: Vec<Value>,
    failing: AtomicBool,
}

impl FakeNewsRepository {
    pub fn with_items(items: Vec<Value>) -> Self {
        Self {
            items,
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TraitNewsRepository for FakeNewsRepository {
    async fn get_all(&self) -> Result<Vec<Value>, SqlxError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.items.clone())
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Value>, SqlxError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.items.iter().find(|item| item["id"] == id).cloned())
    }
}

/// Price rows per stock, served newest first.
#[derive(Default)]
pub struct FakeTransactionRepository {
    rows: Mutex<Vec<(i64, String, f64)>>,
}

impl FakeTransactionRepository {
    pub fn add(&self, stock_id: i64, time: &str, close: f64) {
        self.rows
            .lock()
            .unwrap()
            .push((stock_id, time.to_string(), close));
    }
}

#[async_trait]
impl TraitTransactionRepository for FakeTransactionRepository {
    async fn get_by_stock(&self, stock_id: i64) -> Result<Vec<Value>, SqlxError> {
        let mut rows: Vec<(i64, String, f64)> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _, _)| *id == stock_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(rows
            .into_iter()
            .map(|(id, time, close)| json!({"stock_id": id, "time": time, "close": close}))
            .collect())
    }
}

pub struct FakeHealthCheckRepository {
    pub healthy: bool,
}

#[async_trait]
impl TraitHealthCheckRepository for FakeHealthCheckRepository {
    async fn check(&self) -> Result<bool, SqlxError> {
        if self.healthy {
            Ok(true)
        } else {
            Err(unavailable())
        }
    }
}

/// Collaborators for a test `AppState`; anything left out gets an empty fake.
pub struct TestBackends {
    pub healthy: bool,
    pub index: Arc<FakeIndexRepository>,
    pub financial: Arc<FakeFinancialRepository>,
    pub news: Arc<FakeNewsRepository>,
    pub transactions: Arc<FakeTransactionRepository>,
    pub provider: Arc<FakeMarketDataProvider>,
}

impl Default for TestBackends {
    fn default() -> Self {
        Self {
            healthy: true,
            index: Arc::new(FakeIndexRepository::default()),
            financial: Arc::new(FakeFinancialRepository::default()),
            news: Arc::new(FakeNewsRepository::with_items(Vec::new())),
            transactions: Arc::new(FakeTransactionRepository::default()),
            provider: Arc::new(FakeMarketDataProvider::with_history(FetchOutcome::Empty)),
        }
    }
}

pub fn test_settings() -> AppSettings {
    AppSettings {
        app_config: AppConfig::from_toml_str(TEST_CONFIG).unwrap(),
        app_env: AppEnv {
            env: Env::Local,
            server_address: "127.0.0.1".to_string(),
            server_port: 0,
            postgres_host: "localhost".to_string(),
            postgres_user: "test".to_string(),
            postgres_password: "test".to_string(),
            postgres_database: "test".to_string(),
        },
    }
}

pub async fn test_app_state(backends: TestBackends) -> Arc<AppState> {
    let settings = Arc::new(test_settings());
    let config = &settings.app_config;

    let postgres_service = PostgresService {
        repository_health_check: Arc::new(FakeHealthCheckRepository {
            healthy: backends.healthy,
        }),
        repository_index: backends.index.clone(),
        repository_financial: backends.financial.clone(),
        repository_news: backends.news.clone(),
        repository_transaction: backends.transactions.clone(),
    };

    let index_service = IndexService::new(
        config.indices.clone(),
        backends.index,
        backends.provider.clone(),
    )
    .await;

    Arc::new(AppState {
        settings: settings.clone(),
        postgres_service: Arc::new(postgres_service),
        index_service: Arc::new(index_service),
        financial_service: Arc::new(FinancialService::new(
            backends.financial.clone(),
            config.financial.clone(),
        )),
        news_service: Arc::new(NewsService::new(backends.news)),
        stock_service: Arc::new(StockService::new(
            backends.financial.clone(),
            backends.transactions,
        )),
        stock_updates_service: Arc::new(StockUpdatesService::new(
            backends.provider,
            config.stock_updates.symbols.clone(),
        )),
    })
}
