//! VCI (Vietcap) client for index history and the live price board

use super::errors::ProviderError;
use super::headers::vci_headers;
use super::models::{
    FetchOutcome, OhlcvBar, PriceBoardEntry, VciOhlcResponse, VciPriceBoardItem,
};
use super::provider::TraitMarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The only source this client speaks for.
pub const VCI_SOURCE: &str = "VCI";

/// Daily bars are dated in the exchange's calendar (UTC+7).
const MARKET_UTC_OFFSET_SECS: i32 = 7 * 3600;

#[derive(Clone)]
pub struct VciClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OhlcRequest {
    time_frame: &'static str,
    symbols: Vec<String>,
    to: i64,
    count_back: i64,
}

#[derive(Serialize)]
struct PriceBoardRequest<'a> {
    symbols: &'a [String],
}

impl VciClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .default_headers(vci_headers())
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches daily bars for `[start, end]` and normalizes them.
    pub async fn get_history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, ProviderError> {
        let url = format!("{}/chart/OHLCChart/gap-chart", self.base_url);

        // Calendar days always cover the trading days in the range
        let count_back = (end - start).num_days() + 1;
        let end_timestamp = end
            .and_hms_opt(23, 59, 59)
            .ok_or_else(|| ProviderError::Parse(format!("invalid end date {}", end)))?
            .and_utc()
            .timestamp();

        // Request body
        let payload = OhlcRequest {
            time_frame: "ONE_DAY",
            symbols: vec![map_index_symbol(symbol).to_string()],
            to: end_timestamp,
            count_back,
        };

        debug!(
            "VCI history request: symbol={}, start={}, end={}, count_back={}",
            symbol, start, end, count_back
        );

        // Send request
        let response = self.client.post(&url).json(&payload).send().await?;

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "VCI history request failed for {}: {}",
                symbol,
                response.status()
            )));
        }

        // One entry per requested symbol
        let data: Vec<VciOhlcResponse> = response.json().await?;
        let Some(first) = data.first() else {
            return Err(ProviderError::NoData);
        };

        normalize_ohlc(first, start, end)
    }

    pub async fn get_price_board(
        &self,
        symbols: &[String],
    ) -> Result<Vec<PriceBoardEntry>, ProviderError> {
        let url = format!("{}/price/symbols/getList", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&PriceBoardRequest { symbols })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Api(format!(
                "VCI price board request failed: {}",
                response.status()
            )));
        }

        let items: Vec<VciPriceBoardItem> = response.json().await?;
        Ok(normalize_price_board(items))
    }
}

#[async_trait]
impl TraitMarketDataProvider for VciClient {
    async fn fetch_history(
        &self,
        symbol: &str,
        source: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> FetchOutcome {
        // Only VCI is wired up
        if !source.eq_ignore_ascii_case(VCI_SOURCE) {
            let reason = ProviderError::UnsupportedSource(source.to_string());
            warn!("Skipping fetch for {}: {}", symbol, reason);
            return FetchOutcome::Failed(reason.to_string());
        }

        info!(
            "Fetching history for {} (source: {}) from {} to {}",
            symbol, source, start, end
        );

        match self.get_history(symbol, start, end).await {
            Ok(bars) => {
                info!("Fetched {} rows for {}", bars.len(), symbol);
                FetchOutcome::from_bars(bars)
            }
            Err(ProviderError::NoData) => {
                info!("No new data from provider for {} from {} to {}", symbol, start, end);
                FetchOutcome::Empty
            }
            Err(e) => {
                error!("Error fetching history for {}: {}", symbol, e);
                FetchOutcome::Failed(e.to_string())
            }
        }
    }

    async fn fetch_price_board(
        &self,
        symbols: &[String],
    ) -> Result<Vec<PriceBoardEntry>, ProviderError> {
        self.get_price_board(symbols).await
    }
}

/// Index symbols use the provider's own spelling.
pub fn map_index_symbol(symbol: &str) -> &str {
    match symbol.to_uppercase().as_str() {
        "VNINDEX" => "VNINDEX",
        "HNXINDEX" => "HNXIndex",
        "UPCOMINDEX" => "HNXUpcomIndex",
        _ => symbol,
    }
}

/// Turns column arrays into bars within `[start, end]`, sorted ascending.
/// Missing `t` or `c` columns are a shape error; other missing columns become nulls.
pub fn normalize_ohlc(
    data: &VciOhlcResponse,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<OhlcvBar>, ProviderError> {
    let times = data
        .t
        .as_ref()
        .ok_or_else(|| ProviderError::Parse("missing column 't' (time)".to_string()))?;
    let closes = data
        .c
        .as_ref()
        .ok_or_else(|| ProviderError::Parse("missing column 'c' (close)".to_string()))?;

    for (name, column) in [("o", &data.o), ("h", &data.h), ("l", &data.l), ("v", &data.v)] {
        if column.is_none() {
            warn!("Provider response is missing column '{}', filling with nulls", name);
        }
    }

    let offset = FixedOffset::east_opt(MARKET_UTC_OFFSET_SECS)
        .ok_or_else(|| ProviderError::Parse("invalid market offset".to_string()))?;
    let value_at = |column: &Option<Vec<Option<f64>>>, i: usize| {
        column
            .as_ref()
            .and_then(|values| values.get(i).copied().flatten())
            .filter(|v| v.is_finite())
    };

    // Build bars, keeping only the requested range
    let mut bars: Vec<OhlcvBar> = times
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let time = DateTime::from_timestamp(ts, 0)?
                .with_timezone(&offset)
                .date_naive();
            if time < start || time > end {
                return None;
            }
            Some(OhlcvBar {
                time,
                open: value_at(&data.o, i),
                high: value_at(&data.h, i),
                low: value_at(&data.l, i),
                close: closes.get(i).copied().flatten().filter(|v| v.is_finite()),
                volume: value_at(&data.v, i).map(|v| v.round() as i64),
            })
        })
        .collect();

    bars.sort_by_key(|bar| bar.time);
    Ok(bars)
}

pub fn normalize_price_board(items: Vec<VciPriceBoardItem>) -> Vec<PriceBoardEntry> {
    items
        .into_iter()
        .filter_map(|item| {
            let listing = item.listing_info?;
            let symbol = listing.symbol?;
            let matched = item.match_price;
            Some(PriceBoardEntry {
                symbol,
                ref_price: listing.ref_price,
                match_price: matched.as_ref().and_then(|m| m.match_price),
                accumulated_volume: matched.as_ref().and_then(|m| m.accumulated_volume),
            })
        })
        .collect()
}
