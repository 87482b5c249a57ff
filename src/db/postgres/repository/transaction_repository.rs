use crate::db::postgres::connection::PostgresConnection;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::Error as SqlxError;
use std::sync::Arc;
use tracing::{debug, error};

/// Stored daily prices of one stock, read as JSON objects like the other pass-through tables.
#[async_trait]
pub trait TraitTransactionRepository {
    /// Newest first.
    async fn get_by_stock(&self, stock_id: i64) -> Result<Vec<Value>, SqlxError>;
}

pub struct StructTransactionRepository {
    connection: Arc<PostgresConnection>,
}

impl StructTransactionRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitTransactionRepository for StructTransactionRepository {
    async fn get_by_stock(&self, stock_id: i64) -> Result<Vec<Value>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, Value>(
            "SELECT row_to_json(t) FROM transaction_price t WHERE t.stock_id = $1 ORDER BY t.time DESC",
        )
        .bind(stock_id)
        .fetch_all(pool)
        .await;

        match &result {
            Ok(rows) => debug!("Fetched {} price rows for stock_id={}", rows.len(), stock_id),
            Err(e) => error!("Error fetching price rows for stock_id={}: {}", stock_id, e),
        }

        result
    }
}
