use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// A row of the `index_types` lookup table
#[derive(Debug, Clone, FromRow)]
pub struct IndexTypeRow {
    pub id: i64,
    pub index_type: String,
}

/// One stored daily observation, unique on (index_type_id, time)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct IndexHistoryRow {
    pub index_type_id: i64,
    pub time: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}
