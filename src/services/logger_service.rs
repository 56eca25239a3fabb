//! Logger management service
//!
//! Business rules for creating, reading and deleting loggers. HTTP handlers
//! only translate requests into these calls.

use std::sync::Arc;

use actix_web::http::header::HeaderValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{IpShorterError, Result};
use crate::services::auth::ApiKeyAuthorizer;
use crate::storage::{Logger, LoggerStore, OwnerDirectory, Visitor};
use crate::utils::{generate_logger_id, generate_token};

/// Generic failure for unknown ids and foreign loggers alike.
const LOGGER_NOT_FOUND: &str = "logger not found";

// ============ Response DTOs ============

/// Returned by create: enough to build the short link and dashboard link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedLogger {
    pub id: String,
    pub url: String,
    pub dashboard: String,
}

impl From<&Logger> for CreatedLogger {
    fn from(logger: &Logger) -> Self {
        Self {
            id: logger.id.clone(),
            url: logger.url.clone(),
            dashboard: logger.dashboard.clone(),
        }
    }
}

/// Read-only analytics reachable with the dashboard token. Never carries the API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedDashboard {
    pub id: String,
    pub url: String,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub visitors: Vec<Visitor>,
}

impl From<Logger> for SharedDashboard {
    fn from(logger: Logger) -> Self {
        Self {
            id: logger.id,
            url: logger.url,
            clicks: logger.clicks,
            created_at: logger.created_at,
            visitors: logger.visitors,
        }
    }
}

// ============ LoggerService Implementation ============

pub struct LoggerService {
    loggers: Arc<dyn LoggerStore>,
    owners: Arc<dyn OwnerDirectory>,
    authorizer: Arc<dyn ApiKeyAuthorizer>,
}

impl LoggerService {
    pub fn new(
        loggers: Arc<dyn LoggerStore>,
        owners: Arc<dyn OwnerDirectory>,
        authorizer: Arc<dyn ApiKeyAuthorizer>,
    ) -> Self {
        Self {
            loggers,
            owners,
            authorizer,
        }
    }

    /// Register `url` under `api_key`.
    ///
    /// A url belongs to one owner. The same owner asking again gets the
    /// existing logger back; anyone else gets `Conflict`. The unique key on
    /// the url settles concurrent creates the same way.
    pub async fn create_logger(&self, api_key: &str, url: &str) -> Result<CreatedLogger> {
        let url = url.trim();
        if url.is_empty() {
            return Err(IpShorterError::validation("url is required"));
        }
        // 必须能放进 Location 头
        if HeaderValue::from_bytes(url.as_bytes()).is_err() {
            return Err(IpShorterError::validation(
                "url contains characters that cannot be redirected to",
            ));
        }

        if let Some(existing) = self.loggers.find_by_url(url).await? {
            return self.claim_existing(api_key, existing);
        }

        if api_key.is_empty() || self.owners.find_by_api_key(api_key).await?.is_none() {
            return Err(IpShorterError::invalid_api_key(format!(
                "{} does not exist as an apiKey",
                api_key
            )));
        }

        let logger = Logger::new(
            generate_logger_id(),
            url.to_string(),
            generate_token(),
            api_key.to_string(),
        );
        match self.loggers.create(&logger).await {
            Ok(()) => {}
            Err(IpShorterError::Conflict(_)) => {
                // 并发创建：另一请求先写入了同一 url
                let existing = self.loggers.find_by_url(url).await?.ok_or_else(|| {
                    IpShorterError::conflict(format!("{} is already registered", url))
                })?;
                return self.claim_existing(api_key, existing);
            }
            Err(e) => return Err(e),
        }

        info!("Logger {} registered for {}", logger.id, logger.url);
        Ok(CreatedLogger::from(&logger))
    }

    fn claim_existing(&self, api_key: &str, existing: Logger) -> Result<CreatedLogger> {
        if self.authorizer.owns(api_key, &existing.api_key) {
            debug!("Logger for {} already owned by caller: {}", existing.url, existing.id);
            return Ok(CreatedLogger::from(&existing));
        }
        Err(IpShorterError::conflict(format!(
            "{} is already registered by another apiKey",
            existing.url
        )))
    }

    /// Everything owned by `api_key`. An unknown key owns nothing.
    pub async fn list_loggers(&self, api_key: &str) -> Result<Vec<Logger>> {
        if api_key.is_empty() {
            return Ok(Vec::new());
        }
        self.loggers.find_all_by_api_key(api_key).await
    }

    /// One logger, provided `api_key` owns it.
    pub async fn get_logger(&self, api_key: &str, id: &str) -> Result<Logger> {
        let logger = match self.loggers.find_by_id(id).await {
            Ok(logger) => logger,
            Err(IpShorterError::NotFound(_)) => {
                return Err(IpShorterError::not_found(LOGGER_NOT_FOUND));
            }
            Err(e) => return Err(e),
        };

        if !self.authorizer.owns(api_key, &logger.api_key) {
            return Err(IpShorterError::not_found(LOGGER_NOT_FOUND));
        }
        Ok(logger)
    }

    pub async fn delete_logger(&self, api_key: &str, id: &str) -> Result<()> {
        let logger = self.get_logger(api_key, id).await?;
        self.loggers.delete(&logger.id).await?;
        info!("Logger {} deleted by its owner", logger.id);
        Ok(())
    }

    /// Owner-scoped scan. Returns the same record `get_logger` would.
    pub async fn dashboard(&self, api_key: &str, id: &str) -> Result<Logger> {
        self.list_loggers(api_key)
            .await?
            .into_iter()
            .find(|logger| logger.id == id && self.authorizer.owns(api_key, &logger.api_key))
            .ok_or_else(|| IpShorterError::not_found(LOGGER_NOT_FOUND))
    }

    /// Read-only view for holders of the dashboard token.
    pub async fn shared_dashboard(&self, token: &str) -> Result<SharedDashboard> {
        if token.is_empty() {
            return Err(IpShorterError::not_found("dashboard not found"));
        }
        let logger = self.loggers.find_by_dashboard_token(token).await?;
        Ok(SharedDashboard::from(logger))
    }
}
