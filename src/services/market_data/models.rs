use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized daily bar from the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OhlcvBar {
    pub time: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

/// Result of a history fetch. `Empty` means the provider answered with nothing new,
/// `Failed` means it could not be asked or answered with something unusable.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Empty,
    Rows(Vec<OhlcvBar>),
    Failed(String),
}

impl FetchOutcome {
    pub fn from_bars(bars: Vec<OhlcvBar>) -> Self {
        if bars.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Rows(bars)
        }
    }
}

/// One row of the live price board.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBoardEntry {
    pub symbol: String,
    pub match_price: Option<f64>,
    pub ref_price: Option<f64>,
    pub accumulated_volume: Option<f64>,
}

/// Raw OHLC response from the gap-chart endpoint (column arrays).
/// Every column is optional so a shape change is detected instead of failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct VciOhlcResponse {
    #[serde(default, deserialize_with = "deserialize_timestamps")]
    pub t: Option<Vec<i64>>,
    #[serde(default)]
    pub o: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub h: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub l: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub c: Option<Vec<Option<f64>>>,
    #[serde(default)]
    pub v: Option<Vec<Option<f64>>>,
}

/// Timestamps arrive either as numbers or as numeric strings.
fn deserialize_timestamps<'de, D>(deserializer: D) -> Result<Option<Vec<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    let Some(values) = raw else {
        return Ok(None);
    };

    values
        .into_iter()
        .map(|value| match value {
            serde_json::Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| D::Error::custom("invalid timestamp number")),
            serde_json::Value::String(s) => s
                .parse::<i64>()
                .map_err(|_| D::Error::custom(format!("invalid timestamp string: {}", s))),
            other => Err(D::Error::custom(format!(
                "expected number or string for timestamp, got {}",
                other
            ))),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Some)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VciPriceBoardItem {
    #[serde(default)]
    pub listing_info: Option<VciListingInfo>,
    #[serde(default)]
    pub match_price: Option<VciMatchPrice>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VciListingInfo {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub ref_price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VciMatchPrice {
    #[serde(default)]
    pub match_price: Option<f64>,
    #[serde(default)]
    pub accumulated_volume: Option<f64>,
}
