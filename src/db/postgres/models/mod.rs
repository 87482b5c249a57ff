pub mod financial;
pub mod index_history;
