use super::ProviderError;
use super::models::{FetchOutcome, PriceBoardEntry};
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait TraitMarketDataProvider {
    /// Daily OHLCV bars for `symbol` over `[start, end]`, ascending by date.
    /// Never fails the caller: unavailability is reported as `FetchOutcome::Failed`.
    async fn fetch_history(
        &self,
        symbol: &str,
        source: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchOutcome;

    /// Live price board for a list of stock symbols.
    async fn fetch_price_board(
        &self,
        symbols: &[String],
    ) -> Result<Vec<PriceBoardEntry>, ProviderError>;
}
