use std::sync::Arc;
use std::time::Duration;

use actix_web::dev::ServerHandle;
use tokio::signal;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::storage::SeaOrmStorage;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Resolves on Ctrl+C. A broken signal handler also counts as a request to stop.
pub async fn listen_for_shutdown() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// Stop accepting connections, let in-flight requests finish, then close the pool.
///
/// Visit recordings still running on detached tasks are not awaited; their
/// writes fail once the pool is closed and are only logged.
pub async fn perform_shutdown(handle: ServerHandle, storage: Arc<SeaOrmStorage>) {
    let result = timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), async {
        handle.stop(true).await;
        info!("HTTP server stopped");

        if let Err(e) = storage.close().await {
            error!("Failed to close storage: {}", e);
        }
    })
    .await;

    match result {
        Ok(()) => info!("All shutdown tasks completed successfully"),
        Err(_) => error!(
            "Shutdown tasks timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
