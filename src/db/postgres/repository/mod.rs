pub mod financial_repository;
pub mod health_check_repository;
pub mod index_repository;
pub mod news_repository;
pub mod transaction_repository;
