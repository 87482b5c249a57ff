pub mod errors;
pub mod headers;
pub mod models;
pub mod provider;
pub mod vci_client;

pub use errors::ProviderError;
pub use models::{FetchOutcome, OhlcvBar, PriceBoardEntry};
pub use provider::TraitMarketDataProvider;
pub use vci_client::VciClient;
