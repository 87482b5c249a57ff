use crate::db::postgres::models::index_history::IndexHistoryRow;
use crate::db::postgres::repository::index_repository::TraitIndexRepository;
use crate::services::market_data::OhlcvBar;
use chrono::NaiveDate;
use sqlx::Error as SqlxError;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Gap detection, incremental persistence and read-back of one index series.
pub struct IndexSynchronizer {
    repository: Arc<dyn TraitIndexRepository + Send + Sync>,
}

impl IndexSynchronizer {
    pub fn new(repository: Arc<dyn TraitIndexRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Day after the latest stored row, or `None` when nothing is stored or the query fails.
    pub async fn next_start_date(&self, table: &str, index_type_id: i64) -> Option<NaiveDate> {
        match self.repository.get_latest_time(table, index_type_id).await {
            Ok(Some(latest)) => latest.succ_opt(),
            Ok(None) => None,
            Err(e) => {
                error!(
                    "Failed to get latest date for index_type_id={}: {}",
                    index_type_id, e
                );
                None
            }
        }
    }

    /// Stores the fetched bars that are not already present and returns how many were inserted.
    /// The existence check is scoped to the fetched date range; rows without a close are dropped.
    pub async fn persist(
        &self,
        table: &str,
        index_type_id: i64,
        bars: &[OhlcvBar],
    ) -> Result<u64, SqlxError> {
        let candidates: Vec<IndexHistoryRow> = bars
            .iter()
            .filter(|bar| bar.close.is_some())
            .map(|bar| IndexHistoryRow {
                index_type_id,
                time: bar.time,
                open: bar.open,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                volume: bar.volume,
            })
            .collect();

        let (Some(min_date), Some(max_date)) = (
            candidates.iter().map(|row| row.time).min(),
            candidates.iter().map(|row| row.time).max(),
        ) else {
            debug!("No insertable rows for index_type_id={}", index_type_id);
            return Ok(0);
        };

        let existing: HashSet<NaiveDate> = self
            .repository
            .get_existing_times(table, index_type_id, min_date, max_date)
            .await?
            .into_iter()
            .collect();

        let new_rows: Vec<IndexHistoryRow> = candidates
            .into_iter()
            .filter(|row| !existing.contains(&row.time))
            .collect();

        if new_rows.is_empty() {
            info!(
                "All fetched rows for index_type_id={} between {} and {} already exist",
                index_type_id, min_date, max_date
            );
            return Ok(0);
        }

        self.repository.insert_rows(table, &new_rows).await
    }

    /// Full stored series, ascending by date. Unresolved indices have no series.
    pub async fn read_all(
        &self,
        table: &str,
        index_type_id: Option<i64>,
    ) -> Result<Vec<IndexHistoryRow>, SqlxError> {
        match index_type_id {
            Some(id) => self.repository.get_all_rows(table, id).await,
            None => Ok(Vec::new()),
        }
    }
}
