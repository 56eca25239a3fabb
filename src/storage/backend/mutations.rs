//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations. Counter and history
//! updates are single statements, so concurrent redirects never lose writes.

use sea_orm::{ColumnTrait, EntityTrait, ExprTrait, QueryFilter, SqlErr, sea_query::Expr};
use tracing::{debug, info};

use super::SeaOrmStorage;
use super::converters::{logger_to_active_model, owner_to_active_model, visitor_to_active_model};
use crate::errors::{IpShorterError, Result};
use crate::storage::{Logger, Owner, Visitor};

use migration::entities::{logger, user, visitor};

impl SeaOrmStorage {
    /// `DuplicateIdentifier` for a taken id, `Conflict` for a taken url.
    pub(super) async fn insert_logger(&self, record: &Logger) -> Result<()> {
        let inserted = logger::Entity::insert(logger_to_active_model(record))
            .exec(&self.db)
            .await;

        if let Err(e) = inserted {
            return Err(match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    // 区分 url 冲突与 id 冲突
                    if self.url_registered(&record.url).await? {
                        IpShorterError::conflict(format!("{} is already registered", record.url))
                    } else {
                        IpShorterError::duplicate_identifier(format!(
                            "logger id {} already exists",
                            record.id
                        ))
                    }
                }
                _ => IpShorterError::database_operation(format!("Failed to create logger: {}", e)),
            });
        }

        info!("Logger created: {}", record.id);
        Ok(())
    }

    /// `UPDATE loggers SET clicks = clicks + 1 WHERE id = ?`
    pub(super) async fn increment_click_count(&self, id: &str) -> Result<()> {
        let result = logger::Entity::update_many()
            .col_expr(
                logger::Column::Clicks,
                Expr::col(logger::Column::Clicks).add(1),
            )
            .filter(logger::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to increment clicks: {}", e))
            })?;

        if result.rows_affected == 0 {
            return Err(IpShorterError::not_found(format!("logger {} not found", id)));
        }
        Ok(())
    }

    pub(super) async fn insert_visitor(&self, logger_id: &str, entry: &Visitor) -> Result<()> {
        visitor::Entity::insert(visitor_to_active_model(logger_id, entry)?)
            .exec(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to append visitor: {}", e))
            })?;

        debug!("Visitor appended to logger {}", logger_id);
        Ok(())
    }

    /// Visitors go first so a failed delete never leaves history without its logger.
    pub(super) async fn remove_logger(&self, id: &str) -> Result<()> {
        visitor::Entity::delete_many()
            .filter(visitor::Column::LoggerId.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to delete visitors: {}", e))
            })?;

        let result = logger::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(|e| {
                IpShorterError::database_operation(format!("Failed to delete logger: {}", e))
            })?;

        if result.rows_affected == 0 {
            return Err(IpShorterError::not_found(format!("logger {} not found", id)));
        }

        info!("Logger deleted: {}", id);
        Ok(())
    }

    pub(super) async fn insert_owner(&self, owner: &Owner) -> Result<()> {
        user::Entity::insert(owner_to_active_model(owner))
            .exec(&self.db)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    IpShorterError::conflict(format!("{} already has an apiKey", owner.email))
                }
                _ => IpShorterError::database_operation(format!("Failed to create owner: {}", e)),
            })?;

        info!("Owner registered: {}", owner.email);
        Ok(())
    }
}
