//! Live quote snapshots for the stock-updates push channel

use crate::services::market_data::{PriceBoardEntry, TraitMarketDataProvider};
use crate::utils::rounding::{finite, round_to};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: String,
    pub current_price: Option<f64>,
    pub prior_close: Option<f64>,
    pub volume: Option<i64>,
    pub price_change: Option<f64>,
    pub percent_change: Option<f64>,
}

/// What one push tick sends: the quote list, or `{"error": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StockSnapshot {
    Quotes(Vec<StockQuote>),
    Error { error: String },
}

impl StockSnapshot {
    fn error(message: impl Into<String>) -> Self {
        StockSnapshot::Error {
            error: message.into(),
        }
    }
}

pub struct StockUpdatesService {
    provider: Arc<dyn TraitMarketDataProvider + Send + Sync>,
    symbols: Vec<String>,
}

impl StockUpdatesService {
    pub fn new(provider: Arc<dyn TraitMarketDataProvider + Send + Sync>, symbols: Vec<String>) -> Self {
        Self { provider, symbols }
    }

    pub async fn snapshot(&self) -> StockSnapshot {
        if self.symbols.is_empty() {
            error!("Stock symbol list is empty");
            return StockSnapshot::error("Stock symbol list is empty.");
        }

        info!("Fetching price board for {} symbols", self.symbols.len());

        match self.provider.fetch_price_board(&self.symbols).await {
            Ok(entries) if entries.is_empty() => {
                warn!("Price board returned no rows");
                StockSnapshot::error("No data from the price board or data is empty.")
            }
            Ok(entries) => StockSnapshot::Quotes(build_stock_updates(&entries)),
            Err(e) => {
                error!("Failed to fetch price board: {}", e);
                StockSnapshot::error(format!("Error fetching price board: {}", e))
            }
        }
    }
}

/// Derives price change and percent change per symbol; missing inputs give null outputs.
pub fn build_stock_updates(entries: &[PriceBoardEntry]) -> Vec<StockQuote> {
    entries
        .iter()
        .map(|entry| {
            let current_price = finite(entry.match_price);
            let prior_close = finite(entry.ref_price);
            let price_change = current_price.zip(prior_close).map(|(c, p)| c - p);
            let percent_change = price_change
                .zip(prior_close)
                .filter(|(_, p)| *p != 0.0)
                .map(|(change, p)| round_to(change / p * 100.0, 2));

            StockQuote {
                symbol: entry.symbol.clone(),
                current_price,
                prior_close,
                volume: finite(entry.accumulated_volume).map(|v| v.round() as i64),
                price_change,
                percent_change,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::market_data::{FetchOutcome, ProviderError};
    use crate::test_support::FakeMarketDataProvider;

    fn entry(symbol: &str, matched: Option<f64>, reference: Option<f64>) -> PriceBoardEntry {
        PriceBoardEntry {
            symbol: symbol.to_string(),
            match_price: matched,
            ref_price: reference,
            accumulated_volume: Some(1200.0),
        }
    }

    #[test]
    fn test_build_stock_updates() {
        let quotes = build_stock_updates(&[
            entry("VCB", Some(91500.0), Some(90000.0)),
            entry("BID", None, Some(45000.0)),
            entry("CTG", Some(30000.0), Some(0.0)),
        ]);

        assert_eq!(quotes[0].price_change, Some(1500.0));
        assert_eq!(quotes[0].percent_change, Some(1.67));
        assert_eq!(quotes[0].volume, Some(1200));
        assert_eq!(quotes[1].price_change, None);
        assert_eq!(quotes[1].percent_change, None);
        assert_eq!(quotes[2].price_change, Some(30000.0));
        assert_eq!(quotes[2].percent_change, None);
    }

    #[test]
    fn test_snapshot_serialization() {
        let quotes = StockSnapshot::Quotes(build_stock_updates(&[entry(
            "VCB",
            Some(91500.0),
            Some(90000.0),
        )]));
        let json = serde_json::to_value(&quotes).unwrap();
        assert_eq!(json[0]["currentPrice"], 91500.0);
        assert_eq!(json[0]["priorClose"], 90000.0);

        let error = serde_json::to_string(&StockSnapshot::error("boom")).unwrap();
        assert_eq!(error, r#"{"error":"boom"}"#);
    }

    #[tokio::test]
    async fn test_snapshot_empty_symbols() {
        let provider = Arc::new(FakeMarketDataProvider::with_history(FetchOutcome::Empty));
        let service = StockUpdatesService::new(provider, vec![]);

        assert_eq!(
            service.snapshot().await,
            StockSnapshot::error("Stock symbol list is empty.")
        );
    }

    #[tokio::test]
    async fn test_snapshot_provider_failure() {
        let provider = Arc::new(FakeMarketDataProvider::with_board(Err(ProviderError::Api(
            "503".to_string(),
        ))));
        let service = StockUpdatesService::new(provider, vec!["VCB".to_string()]);

        assert!(matches!(service.snapshot().await, StockSnapshot::Error { error } if error.contains("503")));
    }

    #[tokio::test]
    async fn test_snapshot_empty_board() {
        let provider = Arc::new(FakeMarketDataProvider::with_board(Ok(vec![])));
        let service = StockUpdatesService::new(provider, vec!["VCB".to_string()]);

        assert!(matches!(service.snapshot().await, StockSnapshot::Error { .. }));
    }
}
