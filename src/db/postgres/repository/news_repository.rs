use crate::db::postgres::connection::PostgresConnection;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::Error as SqlxError;
use std::sync::Arc;
use tracing::{debug, error};

/// News rows are passed through untouched, so they are read as JSON objects.
#[async_trait]
pub trait TraitNewsRepository {
    async fn get_all(&self) -> Result<Vec<Value>, SqlxError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Value>, SqlxError>;
}

pub struct StructNewsRepository {
    connection: Arc<PostgresConnection>,
}

impl StructNewsRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitNewsRepository for StructNewsRepository {
    async fn get_all(&self) -> Result<Vec<Value>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, Value>("SELECT row_to_json(n) FROM news n ORDER BY n.id")
            .fetch_all(pool)
            .await;

        match &result {
            Ok(rows) => debug!("Fetched {} news rows", rows.len()),
            Err(e) => error!("Error fetching news: {}", e),
        }

        result
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Value>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_scalar::<_, Value>("SELECT row_to_json(n) FROM news n WHERE n.id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await;

        if let Err(e) = &result {
            error!("Error fetching news id={}: {}", id, e);
        }

        result
    }
}
