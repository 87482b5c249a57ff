use super::display::{DisplayResult, project_display};
use super::registry::{TrackedIndex, resolve_index_types};
use super::synchronizer::IndexSynchronizer;
use crate::db::postgres::models::index_history::IndexHistoryRow;
use crate::db::postgres::repository::index_repository::TraitIndexRepository;
use crate::env_config::models::app_config::IndexConfig;
use crate::services::market_data::{FetchOutcome, TraitMarketDataProvider};
use chrono::{Local, NaiveDate};
use sqlx::Error as SqlxError;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Keeps every tracked index current and projects it for display.
pub struct IndexService {
    indices: Vec<TrackedIndex>,
    synchronizer: IndexSynchronizer,
    provider: Arc<dyn TraitMarketDataProvider + Send + Sync>,
}

impl IndexService {
    /// Resolves index ids once; unresolved indices stay tracked but inert.
    pub async fn new(
        configs: Vec<IndexConfig>,
        repository: Arc<dyn TraitIndexRepository + Send + Sync>,
        provider: Arc<dyn TraitMarketDataProvider + Send + Sync>,
    ) -> Self {
        let indices = resolve_index_types(configs, repository.as_ref()).await;
        info!(
            "Index service tracking {} indices ({} resolved)",
            indices.len(),
            indices.iter().filter(|i| i.index_type_id.is_some()).count()
        );

        Self {
            indices,
            synchronizer: IndexSynchronizer::new(repository),
            provider,
        }
    }

    /// Syncs and projects every index up to the server's local date.
    pub async fn fetch_and_process_all_indices(&self) -> BTreeMap<String, DisplayResult> {
        self.process_all(Local::now().date_naive()).await
    }

    /// Runs the pipeline for each index in turn; a failing index only affects its own entry.
    pub async fn process_all(&self, today: NaiveDate) -> BTreeMap<String, DisplayResult> {
        if self.indices.is_empty() {
            warn!("No indices configured, nothing to process");
            return BTreeMap::new();
        }

        info!("Processing {} indices up to {}", self.indices.len(), today);
        let mut results = BTreeMap::new();

        // Indices run one after another
        for index in &self.indices {
            let symbol = &index.config.symbol;
            info!("--- Processing index: {} ---", symbol);

            let result = match self.update_and_load(index, today).await {
                Ok(rows) => project_display(&rows, symbol),
                Err(e) => {
                    error!("System error while processing index {}: {}", symbol, e);
                    DisplayResult::error(
                        symbol,
                        format!("System error processing {}: {}", symbol, e),
                        Vec::new(),
                    )
                }
            };

            info!("Finished index {} with status {:?}", symbol, result.status);
            results.insert(symbol.clone(), result);
        }

        results
    }

    async fn update_and_load(
        &self,
        index: &TrackedIndex,
        today: NaiveDate,
    ) -> Result<Vec<IndexHistoryRow>, SqlxError> {
        let config = &index.config;

        // Unresolved indices are never fetched or written
        let Some(index_type_id) = index.index_type_id else {
            error!(
                "index_type_id is not resolved for {} (type {}), skipping update",
                config.symbol, config.index_type
            );
            return self.synchronizer.read_all(&config.table, None).await;
        };

        // Continue from the day after the latest stored row
        let start = match self
            .synchronizer
            .next_start_date(&config.table, index_type_id)
            .await
        {
            Some(start) => start,
            None => {
                info!(
                    "No stored data for {}, starting from configured date {}",
                    config.symbol, config.default_start_date
                );
                config.default_start_date
            }
        };

        // Fetch the gap, if there is one
        let outcome = if start > today {
            info!(
                "Start date {} is after {}, nothing new to fetch for {}",
                start, today, config.symbol
            );
            FetchOutcome::Empty
        } else {
            self.provider
                .fetch_history(&config.symbol, &config.source, start, today)
                .await
        };

        // Persist whatever is new; failures keep the stored series usable
        match outcome {
            FetchOutcome::Rows(bars) => {
                match self
                    .synchronizer
                    .persist(&config.table, index_type_id, &bars)
                    .await
                {
                    Ok(count) => info!("{} new records saved for {}", count, config.symbol),
                    Err(e) => error!("Failed to save new records for {}: {}", config.symbol, e),
                }
            }
            FetchOutcome::Empty => info!("No new data fetched for {}", config.symbol),
            FetchOutcome::Failed(reason) => warn!(
                "Fetch failed for {}, continuing with stored data: {}",
                config.symbol, reason
            ),
        }

        // Read back the full series for display
        self.synchronizer
            .read_all(&config.table, Some(index_type_id))
            .await
    }
}
