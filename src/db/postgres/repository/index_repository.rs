use crate::db::postgres::connection::PostgresConnection;
use crate::db::postgres::models::index_history::{IndexHistoryRow, IndexTypeRow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Error as SqlxError, Postgres, QueryBuilder};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Postgres caps bind parameters per statement; 7 columns x 1000 rows stays well below it.
const INSERT_BATCH_SIZE: usize = 1000;

/// Storage for index lookups and per-index daily history.
/// `table` is a validated identifier from configuration.
#[async_trait]
pub trait TraitIndexRepository {
    /// Gets every (id, index_type) pair of the lookup table
    async fn get_index_types(&self) -> Result<Vec<IndexTypeRow>, SqlxError>;

    /// Gets the most recent stored date for an index
    async fn get_latest_time(
        &self,
        table: &str,
        index_type_id: i64,
    ) -> Result<Option<NaiveDate>, SqlxError>;

    /// Gets stored dates for an index within `[from, to]`
    async fn get_existing_times(
        &self,
        table: &str,
        index_type_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, SqlxError>;

    /// Inserts rows, ignoring any that already exist; returns the number actually inserted
    async fn insert_rows(&self, table: &str, rows: &[IndexHistoryRow]) -> Result<u64, SqlxError>;

    /// Gets the full series for an index, ascending by date
    async fn get_all_rows(
        &self,
        table: &str,
        index_type_id: i64,
    ) -> Result<Vec<IndexHistoryRow>, SqlxError>;
}

pub struct StructIndexRepository {
    connection: Arc<PostgresConnection>,
}

impl StructIndexRepository {
    pub fn new(connection: Arc<PostgresConnection>) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl TraitIndexRepository for StructIndexRepository {
    async fn get_index_types(&self) -> Result<Vec<IndexTypeRow>, SqlxError> {
        let pool = self.connection.get_pool();

        let result = sqlx::query_as::<_, IndexTypeRow>(
            "SELECT id::int8 AS id, index_type FROM index_types",
        )
        .fetch_all(pool)
        .await;

        match &result {
            Ok(rows) => debug!("Fetched {} index types", rows.len()),
            Err(e) => error!("Error fetching index types: {}", e),
        }

        result
    }

    async fn get_latest_time(
        &self,
        table: &str,
        index_type_id: i64,
    ) -> Result<Option<NaiveDate>, SqlxError> {
        let pool = self.connection.get_pool();

        let query = format!(
            "SELECT MAX(time)::date FROM {} WHERE index_type_id = $1",
            table
        );
        let result = sqlx::query_scalar::<_, Option<NaiveDate>>(&query)
            .bind(index_type_id)
            .fetch_one(pool)
            .await?;

        debug!(
            "Latest stored date for index_type_id={}: {:?}",
            index_type_id, result
        );

        Ok(result)
    }

    async fn get_existing_times(
        &self,
        table: &str,
        index_type_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<NaiveDate>, SqlxError> {
        let pool = self.connection.get_pool();

        let query = format!(
            "SELECT time::date FROM {}
             WHERE index_type_id = $1 AND time >= $2 AND time <= $3",
            table
        );
        let result = sqlx::query_scalar::<_, NaiveDate>(&query)
            .bind(index_type_id)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await?;

        debug!(
            "Found {} stored dates for index_type_id={} between {} and {}",
            result.len(),
            index_type_id,
            from,
            to
        );

        Ok(result)
    }

    async fn insert_rows(&self, table: &str, rows: &[IndexHistoryRow]) -> Result<u64, SqlxError> {
        if rows.is_empty() {
            debug!("No index rows to insert");
            return Ok(0);
        }

        // All chunks commit together so a sync is one batch
        let mut tx = self.connection.get_pool().begin().await?;
        let mut inserted = 0;

        for batch in rows.chunks(INSERT_BATCH_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} (index_type_id, time, open, high, low, close, volume) ",
                table
            ));
            builder.push_values(batch, |mut values, row| {
                values
                    .push_bind(row.index_type_id)
                    .push_bind(row.time)
                    .push_bind(row.open)
                    .push_bind(row.high)
                    .push_bind(row.low)
                    .push_bind(row.close)
                    .push_bind(row.volume);
            });
            builder.push(" ON CONFLICT (index_type_id, time) DO NOTHING");

            let result = builder.build().execute(&mut *tx).await?;
            debug!(
                "Inserted {} of {} rows in batch",
                result.rows_affected(),
                batch.len()
            );
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        info!("Inserted {} rows into {}", inserted, table);

        Ok(inserted)
    }

    async fn get_all_rows(
        &self,
        table: &str,
        index_type_id: i64,
    ) -> Result<Vec<IndexHistoryRow>, SqlxError> {
        let pool = self.connection.get_pool();

        let query = format!(
            "SELECT index_type_id::int8 AS index_type_id,
                    time::date AS time,
                    open::float8 AS open,
                    high::float8 AS high,
                    low::float8 AS low,
                    close::float8 AS close,
                    volume::int8 AS volume
             FROM {}
             WHERE index_type_id = $1
             ORDER BY time ASC",
            table
        );
        let result = sqlx::query_as::<_, IndexHistoryRow>(&query)
            .bind(index_type_id)
            .fetch_all(pool)
            .await;

        match &result {
            Ok(rows) => debug!(
                "Fetched {} rows for index_type_id={}",
                rows.len(),
                index_type_id
            ),
            Err(e) => error!(
                "Error fetching rows for index_type_id={}: {}",
                index_type_id, e
            ),
        }

        result
    }
}
