use crate::db::postgres::repository::news_repository::TraitNewsRepository;
use crate::services::errors::ServiceError;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

pub struct NewsService {
    repository: Arc<dyn TraitNewsRepository + Send + Sync>,
}

impl NewsService {
    pub fn new(repository: Arc<dyn TraitNewsRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    pub async fn all(&self) -> Result<Vec<Value>, ServiceError> {
        Ok(self.repository.get_all().await?)
    }

    pub async fn by_id(&self, id: i64) -> Result<Value, ServiceError> {
        match self.repository.get_by_id(id).await? {
            Some(item) => Ok(item),
            None => {
                warn!("News id={} not found", id);
                Err(ServiceError::NotFound("News not found".to_string()))
            }
        }
    }
}
