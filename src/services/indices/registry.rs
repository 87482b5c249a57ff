use crate::db::postgres::repository::index_repository::TraitIndexRepository;
use crate::env_config::models::app_config::IndexConfig;
use std::collections::HashMap;
use tracing::{error, info, warn};

/// A configured index together with its resolved storage id.
/// `index_type_id` stays `None` when the lookup table has no matching `index_type`,
/// which makes the index inert for both ingestion and read-back.
#[derive(Debug, Clone)]
pub struct TrackedIndex {
    pub config: IndexConfig,
    pub index_type_id: Option<i64>,
}

/// Resolves every configured index against the `index_types` lookup table, once.
/// A lookup failure leaves every id unresolved instead of failing startup.
pub async fn resolve_index_types(
    configs: Vec<IndexConfig>,
    repository: &(dyn TraitIndexRepository + Send + Sync),
) -> Vec<TrackedIndex> {
    let lookup: HashMap<String, i64> = match repository.get_index_types().await {
        Ok(rows) => rows
            .into_iter()
            .map(|row| (row.index_type, row.id))
            .collect(),
        Err(e) => {
            error!("Failed to load index types, all indices stay unresolved: {}", e);
            HashMap::new()
        }
    };

    configs
        .into_iter()
        .map(|config| {
            let index_type_id = lookup.get(&config.index_type).copied();
            match index_type_id {
                Some(id) => info!(
                    "Resolved {} (type {}) to index_type_id={}",
                    config.symbol, config.index_type, id
                ),
                None => warn!(
                    "No index_types row for {} (type {}), index will be skipped",
                    config.symbol, config.index_type
                ),
            }
            TrackedIndex {
                config,
                index_type_id,
            }
        })
        .collect()
}
