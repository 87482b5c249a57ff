pub mod financial_service;
pub mod period;
pub mod pivot;

pub use financial_service::{CapitalTotal, FinancialService};
pub use period::Period;
