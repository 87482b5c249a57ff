use crate::db::postgres::{
    connection::PostgresConnection,
    repository::{
        financial_repository::{StructFinancialRepository, TraitFinancialRepository},
        health_check_repository::{StructHealthCheckRepository, TraitHealthCheckRepository},
        index_repository::{StructIndexRepository, TraitIndexRepository},
        news_repository::{StructNewsRepository, TraitNewsRepository},
        transaction_repository::{StructTransactionRepository, TraitTransactionRepository},
    },
};
use crate::env_config::models::app_setting::AppSettings;
use std::sync::Arc;
use tracing::{error, info};

pub struct PostgresService {
    pub repository_health_check: Arc<dyn TraitHealthCheckRepository + Send + Sync>,
    pub repository_index: Arc<dyn TraitIndexRepository + Send + Sync>,
    pub repository_financial: Arc<dyn TraitFinancialRepository + Send + Sync>,
    pub repository_news: Arc<dyn TraitNewsRepository + Send + Sync>,
    pub repository_transaction: Arc<dyn TraitTransactionRepository + Send + Sync>,
}

impl PostgresService {
    pub async fn new(settings: &Arc<AppSettings>) -> Result<Self, Box<dyn std::error::Error>> {
        info!("Initializing PostgreSQL service components");

        info!("Creating PostgreSQL connection");
        let postgres_connection = match PostgresConnection::new(settings.clone()).await {
            Ok(conn) => {
                info!("PostgreSQL connection established successfully");
                Arc::new(conn)
            }
            Err(e) => {
                error!("Failed to establish PostgreSQL connection: {}", e);
                return Err(Box::new(e));
            }
        };

        info!("Initializing repositories");

        let health_check_repository = Arc::new(StructHealthCheckRepository::new(
            postgres_connection.clone(),
        )) as Arc<dyn TraitHealthCheckRepository + Send + Sync>;

        let index_repository = Arc::new(StructIndexRepository::new(postgres_connection.clone()))
            as Arc<dyn TraitIndexRepository + Send + Sync>;

        let financial_repository = Arc::new(StructFinancialRepository::new(
            postgres_connection.clone(),
        )) as Arc<dyn TraitFinancialRepository + Send + Sync>;

        let news_repository = Arc::new(StructNewsRepository::new(postgres_connection.clone()))
            as Arc<dyn TraitNewsRepository + Send + Sync>;

        let transaction_repository =
            Arc::new(StructTransactionRepository::new(postgres_connection))
                as Arc<dyn TraitTransactionRepository + Send + Sync>;

        info!("PostgreSQL service initialized successfully");
        Ok(Self {
            repository_health_check: health_check_repository,
            repository_index: index_repository,
            repository_financial: financial_repository,
            repository_news: news_repository,
            repository_transaction: transaction_repository,
        })
    }
}
