use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::models::financial::{
    FinancialDataPoint, FinancialReportRow, FinancialValueRow, LineItemRow, MarketCapRow,
};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::Error as SqlxError;
use std::sync::Arc;
use tracing::{debug, error};

/// Read access to stocks, statements and their line item values.
#[async_trait]
pub trait TraitFinancialRepository {
    async fn get_stocks(&self) -> Result<Vec<Value>, SqlxError>;
    async fn get_report_types(&self) -> Result<Vec<Value>, SqlxError>;
    async fn get_line_items_raw(&self, report_type_id: i64) -> Result<Vec<Value>, SqlxError>;
    async fn get_line_items(&self, report_type_id: i64) -> Result<Vec<LineItemRow>, SqlxError>;
    async fn find_stock_id(&self, symbol: &str) -> Result<Option<i64>, SqlxError>;

    /// Reports of one stock and statement type within `[first_year, last_year]`.
    /// `quarterly` keeps only Q1..Q4 reports.
    async fn get_reports(
        &self,
        stock_id: i64,
        report_type_id: i64,
        first_year: i32,
        last_year: i32,
        quarterly: bool,
    ) -> Result<Vec<FinancialReportRow>, SqlxError>;

    async fn get_values_for_reports(
        &self,
        report_ids: &[i64],
    ) -> Result<Vec<FinancialValueRow>, SqlxError>;

    async fn get_report_ids_for_period(
        &self,
        year: i32,
        quarter: &str,
    ) -> Result<Vec<i64>, SqlxError>;

    async fn get_line_item_values(
        &self,
        report_ids: &[i64],
        line_item_id: i64,
    ) -> Result<Vec<Option<f64>>, SqlxError>;

    async fn get_market_cap_rows(
        &self,
        line_item_id: i64,
        year: i32,
        quarter: &str,
        min_stock_id: i64,
        max_stock_id: i64,
    ) -> Result<Vec<MarketCapRow>, SqlxError>;

    /// Calls the `get_financial_data_for_chart` database function
    async fn get_chart_data(
        &self,
        line_item_id: i64,
        year: i32,
        quarter: &str,
    ) -> Result<Vec<FinancialDataPoint>, SqlxError>;
}

pub struct StructFinancialRepository {
    connection: Arc<PostgresConnection>,
}

impl StructFinancialRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitFinancialRepository for StructFinancialRepository {
    async fn get_stocks(&self) -> Result<Vec<Value>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, Value>(
            "SELECT row_to_json(s) FROM stocks s ORDER BY s.stock_id",
        )
        .fetch_all(pool)
        .await;

        match &result {
            Ok(rows) => debug!("Fetched {} stocks", rows.len()),
            Err(e) => error!("Error fetching stocks: {}", e),
        }

        result
    }

    async fn get_report_types(&self) -> Result<Vec<Value>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, Value>("SELECT row_to_json(r) FROM report_types r")
            .fetch_all(pool)
            .await;

        match &result {
            Ok(rows) => debug!("Fetched {} report types", rows.len()),
            Err(e) => error!("Error fetching report types: {}", e),
        }

        result
    }

    async fn get_line_items_raw(&self, report_type_id: i64) -> Result<Vec<Value>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, Value>(
            "SELECT row_to_json(li) FROM line_items li
             WHERE li.report_type_id = $1
             ORDER BY li.line_item_id",
        )
        .bind(report_type_id)
        .fetch_all(pool)
        .await;

        match &result {
            Ok(rows) => debug!(
                "Fetched {} line items for report_type_id={}",
                rows.len(),
                report_type_id
            ),
            Err(e) => error!(
                "Error fetching line items for report_type_id={}: {}",
                report_type_id, e
            ),
        }

        result
    }

    async fn get_line_items(&self, report_type_id: i64) -> Result<Vec<LineItemRow>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_as::<_, LineItemRow>(
            "SELECT line_item_id::int8 AS line_item_id, line_item_name::text AS line_item_name
             FROM line_items
             WHERE report_type_id = $1
             ORDER BY line_item_id",
        )
        .bind(report_type_id)
        .fetch_all(pool)
        .await?;

        Ok(result)
    }

    async fn find_stock_id(&self, symbol: &str) -> Result<Option<i64>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, i64>(
            "SELECT stock_id::int8 FROM stocks WHERE symbol = $1 LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(pool)
        .await?;

        debug!("Stock id for {}: {:?}", symbol, result);

        Ok(result)
    }

    async fn get_reports(
        &self,
        stock_id: i64,
        report_type_id: i64,
        first_year: i32,
        last_year: i32,
        quarterly: bool,
    ) -> Result<Vec<FinancialReportRow>, SqlxError> {
        let pool = self.connection.get_pool();

        let mut query = String::from(
            "SELECT report_id::int8 AS report_id, year::int4 AS year, quarter::text AS quarter
             FROM financial_reports
             WHERE stock_id = $1 AND report_type_id = $2 AND year >= $3 AND year <= $4",
        );
        if quarterly {
            query.push_str(" AND quarter IN ('Q1', 'Q2', 'Q3', 'Q4')");
        }
        query.push_str(" ORDER BY report_id");

        let result = sqlx::query_as::<_, FinancialReportRow>(&query)
            .bind(stock_id)
            .bind(report_type_id)
            .bind(first_year)
            .bind(last_year)
            .fetch_all(pool)
            .await?;

        debug!(
            "Fetched {} reports for stock_id={}, report_type_id={}",
            result.len(),
            stock_id,
            report_type_id
        );

        Ok(result)
    }

    async fn get_values_for_reports(
        &self,
        report_ids: &[i64],
    ) -> Result<Vec<FinancialValueRow>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_as::<_, FinancialValueRow>(
            "SELECT report_id::int8 AS report_id,
                    line_item_id::int8 AS line_item_id,
                    value::float8 AS value
             FROM financial_data
             WHERE report_id = ANY($1)",
        )
        .bind(report_ids)
        .fetch_all(pool)
        .await?;

        debug!(
            "Fetched {} values for {} reports",
            result.len(),
            report_ids.len()
        );

        Ok(result)
    }

    async fn get_report_ids_for_period(
        &self,
        year: i32,
        quarter: &str,
    ) -> Result<Vec<i64>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, i64>(
            "SELECT report_id::int8 FROM financial_reports WHERE year = $1 AND quarter = $2",
        )
        .bind(year)
        .bind(quarter)
        .fetch_all(pool)
        .await;

        match &result {
            Ok(ids) => debug!("Found {} reports for {} {}", ids.len(), year, quarter),
            Err(e) => error!("Error fetching reports for {} {}: {}", year, quarter, e),
        }

        result
    }

    async fn get_line_item_values(
        &self,
        report_ids: &[i64],
        line_item_id: i64,
    ) -> Result<Vec<Option<f64>>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, Option<f64>>(
            "SELECT value::float8 FROM financial_data
             WHERE report_id = ANY($1) AND line_item_id = $2",
        )
        .bind(report_ids)
        .bind(line_item_id)
        .fetch_all(pool)
        .await;

        if let Err(e) = &result {
            error!(
                "Error fetching values of line_item_id={}: {}",
                line_item_id, e
            );
        }

        result
    }

    async fn get_market_cap_rows(
        &self,
        line_item_id: i64,
        year: i32,
        quarter: &str,
        min_stock_id: i64,
        max_stock_id: i64,
    ) -> Result<Vec<MarketCapRow>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_as::<_, MarketCapRow>(
            "SELECT s.symbol::text AS symbol, fd.value::float8 AS value
             FROM financial_data fd
             JOIN financial_reports fr ON fr.report_id = fd.report_id
             JOIN stocks s ON s.stock_id = fr.stock_id
             WHERE fd.line_item_id = $1
               AND fr.year = $2
               AND fr.quarter = $3
               AND fr.stock_id >= $4
               AND fr.stock_id <= $5",
        )
        .bind(line_item_id)
        .bind(year)
        .bind(quarter)
        .bind(min_stock_id)
        .bind(max_stock_id)
        .fetch_all(pool)
        .await;

        match &result {
            Ok(rows) => debug!("Fetched {} market cap rows", rows.len()),
            Err(e) => error!("Error fetching market cap rows: {}", e),
        }

        result
    }

    async fn get_chart_data(
        &self,
        line_item_id: i64,
        year: i32,
        quarter: &str,
    ) -> Result<Vec<FinancialDataPoint>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_as::<_, FinancialDataPoint>(
            "SELECT symbol::text AS symbol, value::float8 AS value
             FROM get_financial_data_for_chart($1::int4, $2::int4, $3::text)
             WHERE value IS NOT NULL",
        )
        .bind(line_item_id)
        .bind(year)
        .bind(quarter)
        .fetch_all(pool)
        .await;

        match &result {
            Ok(rows) => debug!(
                "Chart function returned {} rows for line_item_id={}",
                rows.len(),
                line_item_id
            ),
            Err(e) => error!(
                "Error calling get_financial_data_for_chart for line_item_id={}: {}",
                line_item_id, e
            ),
        }

        result
    }
}
