pub mod display;
pub mod index_service;
pub mod registry;
pub mod scheduler;
pub mod synchronizer;

pub use display::{DisplayResult, DisplayStatus};
pub use index_service::IndexService;
