use super::period::Period;
use super::pivot::{StatementRow, pivot_statement};
use crate::db::postgres::models::financial::{FinancialDataPoint, MarketCapRow};
use crate::db::postgres::repository::financial_repository::TraitFinancialRepository;
use crate::env_config::models::app_config::FinancialConfig;
use crate::services::errors::ServiceError;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalTotal {
    pub year_queried: i32,
    pub quarter_queried: String,
    pub line_item_id_queried: i64,
    pub calculated_total_capital: f64,
}

pub struct FinancialService {
    repository: Arc<dyn TraitFinancialRepository + Send + Sync>,
    config: FinancialConfig,
}

impl FinancialService {
    pub fn new(
        repository: Arc<dyn TraitFinancialRepository + Send + Sync>,
        config: FinancialConfig,
    ) -> Self {
        Self { repository, config }
    }

    pub fn config(&self) -> &FinancialConfig {
        &self.config
    }

    pub async fn stocks(&self) -> Result<Vec<Value>, ServiceError> {
        Ok(self.repository.get_stocks().await?)
    }

    pub async fn report_types(&self) -> Result<Vec<Value>, ServiceError> {
        Ok(self.repository.get_report_types().await?)
    }

    pub async fn line_items(&self, report_type_id: i64) -> Result<Vec<Value>, ServiceError> {
        Ok(self.repository.get_line_items_raw(report_type_id).await?)
    }

    /// Statement table of one stock, one row per line item and one column per period
    pub async fn financial_data(
        &self,
        symbol: &str,
        report_type_id: i64,
        period: Period,
    ) -> Result<Vec<StatementRow>, ServiceError> {
        let Some(stock_id) = self.repository.find_stock_id(symbol).await? else {
            warn!("Symbol {} not found", symbol);
            return Err(ServiceError::NotFound("Symbol not found".to_string()));
        };

        let line_items = self.repository.get_line_items(report_type_id).await?;
        let reports = self
            .repository
            .get_reports(
                stock_id,
                report_type_id,
                self.config.report_first_year,
                self.config.report_last_year,
                period == Period::Quarterly,
            )
            .await?;

        if reports.is_empty() {
            return Err(ServiceError::NotFound("No reports found".to_string()));
        }

        let report_ids: Vec<i64> = reports.iter().map(|r| r.report_id).collect();
        let values = self.repository.get_values_for_reports(&report_ids).await?;

        info!(
            "Building {} statement for {} from {} reports and {} values",
            period,
            symbol,
            reports.len(),
            values.len()
        );

        Ok(pivot_statement(
            &line_items,
            &reports,
            &values,
            period,
            self.config.report_first_year,
            self.config.report_last_year,
        ))
    }

    /// Sum of a line item over every report of the period; no reports means zero
    pub async fn total_capital(
        &self,
        year: i32,
        quarter: &str,
        line_item_id: i64,
    ) -> Result<CapitalTotal, ServiceError> {
        let report_ids = self
            .repository
            .get_report_ids_for_period(year, quarter)
            .await?;

        let total = if report_ids.is_empty() {
            info!("No reports for {} {}, total capital is 0", year, quarter);
            0.0
        } else {
            self.repository
                .get_line_item_values(&report_ids, line_item_id)
                .await?
                .into_iter()
                .flatten()
                .sum()
        };

        Ok(CapitalTotal {
            year_queried: year,
            quarter_queried: quarter.to_string(),
            line_item_id_queried: line_item_id,
            calculated_total_capital: total,
        })
    }

    pub async fn market_cap(&self) -> Result<Vec<FinancialDataPoint>, ServiceError> {
        let rows = self
            .repository
            .get_market_cap_rows(
                self.config.default_line_item_id,
                self.config.default_year,
                &self.config.default_quarter,
                self.config.market_cap_min_stock_id,
                self.config.market_cap_max_stock_id,
            )
            .await?;

        Ok(rank_market_cap(rows))
    }

    pub async fn chart_data(&self, line_item_id: i64) -> Result<Vec<FinancialDataPoint>, ServiceError> {
        if line_item_id < 1 {
            return Err(ServiceError::BadRequest(
                "lineItemId must be a positive integer".to_string(),
            ));
        }

        let data = self
            .repository
            .get_chart_data(
                line_item_id,
                self.config.default_year,
                &self.config.default_quarter,
            )
            .await?;

        info!(
            "Received {} chart points for line_item_id={}",
            data.len(),
            line_item_id
        );

        Ok(data)
    }
}

/// Keeps positive values only, largest first.
pub fn rank_market_cap(rows: Vec<MarketCapRow>) -> Vec<FinancialDataPoint> {
    let mut ranked: Vec<FinancialDataPoint> = rows
        .into_iter()
        .filter_map(|row| match row.value {
            Some(value) if value > 0.0 => Some(FinancialDataPoint {
                symbol: row.symbol,
                value,
            }),
            _ => None,
        })
        .collect();

    ranked.sort_by(|a, b| b.value.total_cmp(&a.value));
    ranked
}
