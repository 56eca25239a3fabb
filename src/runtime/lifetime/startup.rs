use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::StaticConfig;
use crate::services::{
    KeyService, LoggerService, Mailer, PlainKeyAuthorizer, RedirectService, build_mailer,
};
use crate::storage::{LoggerStore, OwnerDirectory, SeaOrmStorage, StorageFactory};

/// Everything the HTTP workers share.
#[derive(Clone)]
pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub key_service: Arc<KeyService>,
    pub logger_service: Arc<LoggerService>,
    pub redirect_service: Arc<RedirectService>,
}

impl StartupContext {
    /// Wire the services over an opened store and a mailer.
    pub fn assemble(storage: Arc<SeaOrmStorage>, mailer: Arc<dyn Mailer>, subject: String) -> Self {
        let loggers: Arc<dyn LoggerStore> = storage.clone();
        let owners: Arc<dyn OwnerDirectory> = storage.clone();

        let key_service = Arc::new(KeyService::new(owners.clone(), mailer, subject));
        let logger_service = Arc::new(LoggerService::new(
            loggers.clone(),
            owners,
            Arc::new(PlainKeyAuthorizer),
        ));
        let redirect_service = Arc::new(RedirectService::new(loggers));

        Self {
            storage,
            key_service,
            logger_service,
            redirect_service,
        }
    }
}

/// 准备服务器启动的上下文
/// 包括存储、邮件发送器和各业务服务
pub async fn prepare_server_startup(config: &StaticConfig) -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|e| anyhow::anyhow!("Failed to install rustls crypto provider: {:?}", e))?;

    let storage = StorageFactory::create(&config.database)
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let mailer = build_mailer(&config.mail).context("Failed to initialize mailer")?;

    let context = StartupContext::assemble(storage, mailer, config.mail.subject.clone());

    debug!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}
