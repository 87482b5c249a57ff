use super::app_env::Env;
use chrono::{NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub log: LogConfig,
    pub postgres: PostgresConfig,
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub stock_updates: StockUpdatesConfig,
    pub financial: FinancialConfig,
    pub index_sync: IndexSyncConfig,
    pub indices: Vec<IndexConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct PostgresConfig {
    pub timeout: u64,
    pub max_connections: u32,
    pub min_connections: u32,
    pub max_lifetime: u64,
    pub idle_timeout: u64,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub templates_dir: PathBuf,
    pub static_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Deserialize)]
pub struct StockUpdatesConfig {
    #[serde(default = "default_stock_updates_interval")]
    pub interval_seconds: u64,
    pub symbols: Vec<String>,
}

fn default_stock_updates_interval() -> u64 {
    10
}

/// Defaults for the financial statement endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct FinancialConfig {
    pub default_line_item_id: i64,
    pub default_year: i32,
    pub default_quarter: String,
    pub market_cap_min_stock_id: i64,
    pub market_cap_max_stock_id: i64,
    pub report_first_year: i32,
    pub report_last_year: i32,
}

#[derive(Debug, Deserialize)]
pub struct IndexSyncConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    #[serde(default)]
    pub start_time: Option<String>, // UTC, "HH:MM:SS"
    #[serde(default)]
    pub end_time: Option<String>, // UTC, "HH:MM:SS"
}

/// One tracked market index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    pub symbol: String,
    pub index_type: String,
    pub source: String,
    pub table: String,
    pub default_start_date: NaiveDate,
}

impl AppConfig {
    /// Loads `config/{env}.toml`, panicking on a missing or invalid file.
    pub fn new(env: &Env) -> AppConfig {
        let path = PathBuf::from(format!("config/{}.toml", env));
        AppConfig::load(&path).unwrap_or_else(|e| panic!("CONFIG -> {}", e))
    }

    pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        AppConfig::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<AppConfig, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.indices.is_empty() {
            return Err(ConfigError::Invalid("no [[indices]] configured".to_string()));
        }

        let mut seen = HashSet::new();
        for index in &self.indices {
            if index.symbol.trim().is_empty() {
                return Err(ConfigError::Invalid("index symbol must not be empty".to_string()));
            }
            if !seen.insert(index.symbol.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate index symbol '{}'",
                    index.symbol
                )));
            }
            if index.index_type.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "missing index_type for '{}'",
                    index.symbol
                )));
            }
            if index.source.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "missing source for '{}'",
                    index.symbol
                )));
            }
            if !is_sql_identifier(&index.table) {
                return Err(ConfigError::Invalid(format!(
                    "table '{}' for '{}' is not a plain identifier",
                    index.table, index.symbol
                )));
            }
        }

        if self.stock_updates.interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "stock_updates.interval_seconds must be positive".to_string(),
            ));
        }
        if self.index_sync.interval_seconds == 0 {
            return Err(ConfigError::Invalid(
                "index_sync.interval_seconds must be positive".to_string(),
            ));
        }

        let financial = &self.financial;
        if financial.report_first_year > financial.report_last_year {
            return Err(ConfigError::Invalid(
                "financial.report_first_year is after report_last_year".to_string(),
            ));
        }
        if financial.market_cap_min_stock_id > financial.market_cap_max_stock_id {
            return Err(ConfigError::Invalid(
                "financial.market_cap_min_stock_id is above market_cap_max_stock_id".to_string(),
            ));
        }

        for bound in [&self.index_sync.start_time, &self.index_sync.end_time]
            .into_iter()
            .flatten()
        {
            if NaiveTime::parse_from_str(bound, "%H:%M:%S").is_err() {
                return Err(ConfigError::Invalid(format!(
                    "index_sync window bound '{}' is not HH:MM:SS",
                    bound
                )));
            }
        }

        Ok(())
    }
}

impl IndexSyncConfig {
    /// Checks if the current time is within the allowed operation window
    pub fn is_operation_allowed(&self) -> bool {
        self.is_operation_allowed_at(Utc::now().time())
    }

    pub fn is_operation_allowed_at(&self, now: NaiveTime) -> bool {
        let (Some(start_str), Some(end_str)) = (&self.start_time, &self.end_time) else {
            return true;
        };

        match (
            NaiveTime::parse_from_str(start_str, "%H:%M:%S"),
            NaiveTime::parse_from_str(end_str, "%H:%M:%S"),
        ) {
            (Ok(start), Ok(end)) if start <= end => start <= now && now <= end,
            // Window crosses midnight, e.g. 21:00:00 -> 04:00:00
            (Ok(start), Ok(end)) => start <= now || now <= end,
            _ => true,
        }
    }
}

fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_lowercase() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
pub(crate) const TEST_CONFIG: &str = r#"
[log]
level = "info"
format = "plain"

[postgres]
timeout = 5
max_connections = 2
min_connections = 1
max_lifetime = 60
idle_timeout = 30

[server]
allowed_origins = ["*"]
templates_dir = "templates"
static_dir = "static"

[provider]
base_url = "http://localhost:9/api"
timeout_seconds = 1

[stock_updates]
symbols = ["VCB", "BID"]

[financial]
default_line_item_id = 88
default_year = 2024
default_quarter = "Q4"
market_cap_min_stock_id = 1
market_cap_max_stock_id = 27
report_first_year = 2020
report_last_year = 2024

[index_sync]
enabled = false
interval_seconds = 3600

[[indices]]
symbol = "VNINDEX"
index_type = "VN"
source = "VCI"
table = "index_history"
default_start_date = "2020-01-01"

[[indices]]
symbol = "HNXINDEX"
index_type = "HNX"
source = "VCI"
table = "index_history"
default_start_date = "2020-01-01"
"#;
