//! SeaORM storage backend
//!
//! This module provides database storage using SeaORM,
//! supporting SQLite, MySQL/MariaDB, and PostgreSQL.

mod connection;
mod converters;
mod mutations;
mod query;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::{info, warn};

use crate::errors::{IpShorterError, Result};
use crate::storage::models::StorageConfig;
use crate::storage::{Logger, LoggerStore, Owner, OwnerDirectory, Visitor};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use converters::{
    logger_to_active_model, model_to_logger, model_to_owner, model_to_visitor,
    visitor_to_active_model,
};

/// 从数据库 URL 推断数据库类型
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite:")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(IpShorterError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// SeaORM-based storage backend
///
/// One pool shared by every request. No explicit transactions: each store
/// operation is a single statement except `delete`, which issues two.
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
}

impl SeaOrmStorage {
    /// Connect, run migrations and return a ready store.
    pub async fn open(database_url: &str, backend_name: &str, pool_size: u32) -> Result<Self> {
        if database_url.is_empty() {
            return Err(IpShorterError::database_config("database url is empty"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, pool_size).await?
        };

        run_migrations(&db).await?;

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
        };

        warn!(
            "{} Storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    /// Close the pool. Further calls on clones of this storage will fail.
    pub async fn close(&self) -> Result<()> {
        self.db.clone().close().await.map_err(|e| {
            IpShorterError::database_connection(format!("Failed to close database: {}", e))
        })?;
        info!("{} Storage closed.", self.backend_name.to_uppercase());
        Ok(())
    }

    pub fn get_backend_config(&self) -> StorageConfig {
        StorageConfig {
            storage_type: self.backend_name.clone(),
        }
    }
}

#[async_trait]
impl LoggerStore for SeaOrmStorage {
    async fn create(&self, logger: &Logger) -> Result<()> {
        self.insert_logger(logger).await
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Logger>> {
        self.get_logger_by_url(url).await
    }

    async fn find_by_id(&self, id: &str) -> Result<Logger> {
        self.get_logger(id)
            .await?
            .ok_or_else(|| IpShorterError::not_found(format!("logger {} not found", id)))
    }

    async fn find_url_by_id(&self, id: &str) -> Result<String> {
        self.get_logger_url(id)
            .await?
            .ok_or_else(|| IpShorterError::not_found(format!("logger {} not found", id)))
    }

    async fn find_by_dashboard_token(&self, token: &str) -> Result<Logger> {
        self.get_logger_by_dashboard_token(token)
            .await?
            .ok_or_else(|| IpShorterError::not_found("dashboard not found"))
    }

    async fn find_all_by_api_key(&self, api_key: &str) -> Result<Vec<Logger>> {
        self.list_loggers_by_api_key(api_key).await
    }

    async fn increment_clicks(&self, id: &str) -> Result<()> {
        self.increment_click_count(id).await
    }

    async fn append_visitor(&self, id: &str, visitor: &Visitor) -> Result<()> {
        self.insert_visitor(id, visitor).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.remove_logger(id).await
    }
}

#[async_trait]
impl OwnerDirectory for SeaOrmStorage {
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Owner>> {
        self.get_owner_by_api_key(api_key).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>> {
        self.get_owner_by_email(email).await
    }

    async fn create(&self, owner: &Owner) -> Result<()> {
        self.insert_owner(owner).await
    }
}
