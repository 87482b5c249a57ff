//! Saved price history behind the single-stock page

use crate::db::postgres::repository::financial_repository::TraitFinancialRepository;
use crate::db::postgres::repository::transaction_repository::TraitTransactionRepository;
use crate::services::errors::ServiceError;
use crate::utils::rounding::round_to;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{info, warn};

pub type PriceRow = Map<String, Value>;

pub struct StockService {
    stocks: Arc<dyn TraitFinancialRepository + Send + Sync>,
    transactions: Arc<dyn TraitTransactionRepository + Send + Sync>,
}

impl StockService {
    pub fn new(
        stocks: Arc<dyn TraitFinancialRepository + Send + Sync>,
        transactions: Arc<dyn TraitTransactionRepository + Send + Sync>,
    ) -> Self {
        Self {
            stocks,
            transactions,
        }
    }

    /// Stored prices newest first, each with its change against the next older row.
    /// An unknown symbol has no history.
    pub async fn saved_transactions(&self, symbol: &str) -> Result<Vec<PriceRow>, ServiceError> {
        let Some(stock_id) = self.stocks.find_stock_id(symbol).await? else {
            warn!("Symbol {} not found, no saved prices", symbol);
            return Ok(Vec::new());
        };

        let rows: Vec<PriceRow> = self
            .transactions
            .get_by_stock(stock_id)
            .await?
            .into_iter()
            .filter_map(|row| match row {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();

        info!("Loaded {} saved price rows for {}", rows.len(), symbol);

        Ok(annotate_price_changes(rows))
    }
}

/// Drops the newest row (when there is more than one), then sets `change` and
/// `percent_change` (2 places) of each row against the next older one.
/// The oldest row gets 0 for both; a missing close gives nulls.
pub fn annotate_price_changes(mut rows: Vec<PriceRow>) -> Vec<PriceRow> {
    if rows.len() > 1 {
        rows.remove(0);
    }

    let closes: Vec<Option<f64>> = rows
        .iter()
        .map(|row| row.get("close").and_then(Value::as_f64))
        .collect();

    let last = rows.len().saturating_sub(1);
    for (i, row) in rows.iter_mut().enumerate() {
        let (change, percent_change) = if i == last {
            (json!(0.0), json!(0.0))
        } else {
            match (closes[i], closes[i + 1]) {
                (Some(current), Some(previous)) => {
                    let change = current - previous;
                    let percent = if previous != 0.0 {
                        round_to(change / previous * 100.0, 2)
                    } else {
                        0.0
                    };
                    (json!(round_to(change, 2)), json!(percent))
                }
                _ => (Value::Null, Value::Null),
            }
        };

        row.insert("change".to_string(), change);
        row.insert("percent_change".to_string(), percent_change);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeFinancialRepository, FakeTransactionRepository};

    fn price(time: &str, close: Value) -> PriceRow {
        match json!({"stock_id": 1, "time": time, "close": close}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_annotate_drops_newest_and_diffs_against_older() {
        let rows = annotate_price_changes(vec![
            price("2024-01-05", json!(99.0)),
            price("2024-01-04", json!(101.5)),
            price("2024-01-03", json!(100.0)),
            price("2024-01-02", json!(96.0)),
        ]);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["time"], "2024-01-04");
        assert_eq!(rows[0]["change"], 1.5);
        assert_eq!(rows[0]["percent_change"], 1.5);
        assert_eq!(rows[1]["change"], 4.0);
        assert_eq!(rows[1]["percent_change"], 4.17);
        assert_eq!(rows[2]["change"], 0.0);
        assert_eq!(rows[2]["percent_change"], 0.0);
    }

    #[test]
    fn test_annotate_zero_previous_close() {
        let rows = annotate_price_changes(vec![
            price("2024-01-04", json!(1.0)),
            price("2024-01-03", json!(12.0)),
            price("2024-01-02", json!(0.0)),
        ]);

        assert_eq!(rows[0]["change"], 12.0);
        assert_eq!(rows[0]["percent_change"], 0.0);
    }

    #[test]
    fn test_annotate_single_and_missing_close() {
        let single = annotate_price_changes(vec![price("2024-01-02", json!(50.0))]);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0]["change"], 0.0);

        let rows = annotate_price_changes(vec![
            price("2024-01-04", json!(1.0)),
            price("2024-01-03", Value::Null),
            price("2024-01-02", json!(10.0)),
        ]);
        assert_eq!(rows[0]["change"], Value::Null);
        assert_eq!(rows[0]["percent_change"], Value::Null);

        assert!(annotate_price_changes(vec![]).is_empty());
    }

    #[tokio::test]
    async fn test_saved_transactions() {
        let stocks = FakeFinancialRepository::default();
        stocks.add_stock(1, "VCB");
        let transactions = FakeTransactionRepository::default();
        transactions.add(1, "2024-01-02", 90.0);
        transactions.add(1, "2024-01-03", 92.0);
        transactions.add(1, "2024-01-04", 91.0);
        transactions.add(2, "2024-01-04", 45.0);
        let service = StockService::new(Arc::new(stocks), Arc::new(transactions));

        let rows = service.saved_transactions("VCB").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["time"], "2024-01-03");
        assert_eq!(rows[0]["percent_change"], 2.22);

        assert!(service.saved_transactions("XYZ").await.unwrap().is_empty());
    }
}
