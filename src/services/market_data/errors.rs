use thiserror::Error;

/// Errors raised while talking to the market-data provider
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported data source: {0}")]
    UnsupportedSource(String),

    #[error("No data available")]
    NoData,
}
