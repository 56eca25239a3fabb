//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use tracing::{debug, error};

use super::SeaOrmStorage;
use super::converters::{model_to_logger, model_to_owner, model_to_visitor, url_hash};
use crate::errors::{IpShorterError, Result};
use crate::storage::{Logger, Owner, Visitor};

use migration::entities::{logger, user, visitor};

impl SeaOrmStorage {
    pub(super) async fn get_logger(&self, id: &str) -> Result<Option<Logger>> {
        let model = logger::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to query logger {}: {}", id, e);
                IpShorterError::database_operation(format!("Failed to query logger: {}", e))
            })?;

        self.attach_visitors(model).await
    }

    /// Destination only; the visit history is not loaded.
    pub(super) async fn get_logger_url(&self, id: &str) -> Result<Option<String>> {
        logger::Entity::find_by_id(id.to_string())
            .select_only()
            .column(logger::Column::Url)
            .into_tuple::<String>()
            .one(&self.db)
            .await
            .map_err(|e| {
                error!("Failed to resolve logger {}: {}", id, e);
                IpShorterError::database_operation(format!("Failed to query logger: {}", e))
            })
    }

    pub(super) async fn get_logger_by_url(&self, url: &str) -> Result<Option<Logger>> {
        let model = logger::Entity::find()
            .filter(logger::Column::UrlHash.eq(url_hash(url)))
            .filter(logger::Column::Url.eq(url))
            .one(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to query logger by url: {}", e))
            })?;

        self.attach_visitors(model).await
    }

    pub(super) async fn url_registered(&self, url: &str) -> Result<bool> {
        let id = logger::Entity::find()
            .select_only()
            .column(logger::Column::Id)
            .filter(logger::Column::UrlHash.eq(url_hash(url)))
            .into_tuple::<String>()
            .one(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to query logger by url: {}", e))
            })?;
        Ok(id.is_some())
    }

    pub(super) async fn get_logger_by_dashboard_token(&self, token: &str) -> Result<Option<Logger>> {
        let model = logger::Entity::find()
            .filter(logger::Column::DashboardToken.eq(token))
            .one(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!(
                    "Failed to query logger by dashboard token: {}",
                    e
                ))
            })?;

        self.attach_visitors(model).await
    }

    pub(super) async fn list_loggers_by_api_key(&self, api_key: &str) -> Result<Vec<Logger>> {
        let models = logger::Entity::find()
            .filter(logger::Column::ApiKey.eq(api_key))
            .order_by_asc(logger::Column::CreatedAt)
            .order_by_asc(logger::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to list loggers: {}", e))
            })?;

        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = models.iter().map(|m| m.id.clone()).collect();
        let mut visitors = self.load_visitors(&ids).await?;

        debug!("Loaded {} loggers for one api key", models.len());

        Ok(models
            .into_iter()
            .map(|model| {
                let history = visitors.remove(&model.id).unwrap_or_default();
                model_to_logger(model, history)
            })
            .collect())
    }

    pub(super) async fn get_owner_by_api_key(&self, api_key: &str) -> Result<Option<Owner>> {
        user::Entity::find()
            .filter(user::Column::ApiKey.eq(api_key))
            .one(&self.db)
            .await
            .map(|m| m.map(model_to_owner))
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to query owner: {}", e))
            })
    }

    pub(super) async fn get_owner_by_email(&self, email: &str) -> Result<Option<Owner>> {
        user::Entity::find_by_id(email.to_string())
            .one(&self.db)
            .await
            .map(|m| m.map(model_to_owner))
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to query owner: {}", e))
            })
    }

    async fn attach_visitors(&self, model: Option<logger::Model>) -> Result<Option<Logger>> {
        let Some(model) = model else {
            return Ok(None);
        };

        let mut visitors = self.load_visitors(std::slice::from_ref(&model.id)).await?;
        let history = visitors.remove(&model.id).unwrap_or_default();
        Ok(Some(model_to_logger(model, history)))
    }

    /// 按追加顺序加载访问记录，按 logger id 分组
    async fn load_visitors(&self, logger_ids: &[String]) -> Result<HashMap<String, Vec<Visitor>>> {
        let rows = visitor::Entity::find()
            .filter(visitor::Column::LoggerId.is_in(logger_ids.iter().cloned()))
            .order_by_asc(visitor::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to load visitors: {}", e))
            })?;

        let mut grouped: HashMap<String, Vec<Visitor>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.logger_id.clone())
                .or_default()
                .push(model_to_visitor(row));
        }
        Ok(grouped)
    }
}
