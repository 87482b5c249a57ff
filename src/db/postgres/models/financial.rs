use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct LineItemRow {
    pub line_item_id: i64,
    pub line_item_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct FinancialReportRow {
    pub report_id: i64,
    pub year: i32,
    pub quarter: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct FinancialValueRow {
    pub report_id: i64,
    pub line_item_id: i64,
    pub value: Option<f64>,
}

/// Value of one line item for one stock, joined to the stock's symbol
#[derive(Debug, Clone, FromRow)]
pub struct MarketCapRow {
    pub symbol: String,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct FinancialDataPoint {
    pub symbol: String,
    pub value: f64,
}
