pub mod errors;
pub mod financial;
pub mod indices;
pub mod market_data;
pub mod news;
pub mod stock;
pub mod stock_updates;
