//! Persistence boundary for loggers and owners.
//!
//! Services only see the [`LoggerStore`] and [`OwnerDirectory`] traits;
//! [`SeaOrmStorage`] is the production implementation of both.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DatabaseConfig;
use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::SeaOrmStorage;
pub use models::{Logger, Owner, StorageConfig, Visitor};

/// Logger records and their visit history.
#[async_trait]
pub trait LoggerStore: Send + Sync {
    /// Pure insert. `DuplicateIdentifier` if the id is already taken,
    /// `Conflict` if another logger already holds the url.
    async fn create(&self, logger: &Logger) -> Result<()>;

    /// The logger registered for `url`, if any.
    async fn find_by_url(&self, url: &str) -> Result<Option<Logger>>;

    /// `NotFound` if no logger has this id.
    async fn find_by_id(&self, id: &str) -> Result<Logger>;

    /// Destination url alone, without the visit history. `NotFound` if absent.
    async fn find_url_by_id(&self, id: &str) -> Result<String>;

    /// `NotFound` if no logger has this dashboard token.
    async fn find_by_dashboard_token(&self, token: &str) -> Result<Logger>;

    /// All loggers owned by `api_key`, in insertion order.
    async fn find_all_by_api_key(&self, api_key: &str) -> Result<Vec<Logger>>;

    /// Atomically add one to the click counter.
    async fn increment_clicks(&self, id: &str) -> Result<()>;

    /// Atomically append one visitor to the logger's history.
    async fn append_visitor(&self, id: &str, visitor: &Visitor) -> Result<()>;

    /// Remove the logger and its visit history. `NotFound` if absent.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Email ↔ API key pairs.
#[async_trait]
pub trait OwnerDirectory: Send + Sync {
    async fn find_by_api_key(&self, api_key: &str) -> Result<Option<Owner>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Owner>>;

    async fn create(&self, owner: &Owner) -> Result<()>;
}

pub struct StorageFactory;

impl StorageFactory {
    pub async fn create(config: &DatabaseConfig) -> Result<Arc<SeaOrmStorage>> {
        let database_url = config.connection_url();

        // 从 URL 自动推断数据库类型
        let backend_type = backend::infer_backend_from_url(&database_url)?;

        let storage = SeaOrmStorage::open(&database_url, &backend_type, config.pool_size).await?;
        Ok(Arc::new(storage))
    }
}
