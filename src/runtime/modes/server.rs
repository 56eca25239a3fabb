//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use actix_cors::Cors;
use actix_web::{
    App, HttpServer,
    middleware::{Compress, DefaultHeaders},
    web,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::middleware::RequestIdMiddleware;
use crate::api::services::{api_routes, redirect_routes};
use crate::config::{CorsConfig, StaticConfig};
use crate::runtime::lifetime;
use crate::runtime::lifetime::startup::StartupContext;

/// Build CORS middleware from configuration
pub fn build_cors_middleware(cors_config: &CorsConfig) -> Cors {
    // 关闭时使用浏览器默认的同源策略
    if !cors_config.enabled {
        return Cors::default();
    }

    let mut cors = Cors::default();

    if cors_config.allowed_origins.iter().any(|o| o == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &cors_config.allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    let methods: Vec<actix_web::http::Method> = cors_config
        .allowed_methods
        .iter()
        .filter_map(|m| m.trim().to_uppercase().parse().ok())
        .collect();
    if !methods.is_empty() {
        cors = cors.allowed_methods(methods);
    }

    cors.allow_any_header().max_age(cors_config.max_age)
}

/// Shared state and routes, used by the server and by the HTTP tests.
pub fn configure_app(cfg: &mut web::ServiceConfig, ctx: &StartupContext) {
    cfg.app_data(web::Data::new(ctx.key_service.clone()))
        .app_data(web::Data::new(ctx.logger_service.clone()))
        .app_data(web::Data::new(ctx.redirect_service.clone()))
        .app_data(web::PayloadConfig::new(64 * 1024))
        .service(api_routes())
        .service(redirect_routes());
}

/// Run the HTTP server until it exits or Ctrl+C arrives.
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config)
        .await
        .map_err(|e| {
            tracing::error!("Server startup failed: {}", e);
            e
        })?;

    let storage_for_shutdown = startup.storage.clone();
    let cors_config = config.cors.clone();
    if cors_config.enabled && cors_config.allowed_origins.is_empty() {
        warn!("CORS enabled but allowed_origins is empty, cross-origin requests will be refused");
    }

    let context = startup.clone();
    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestIdMiddleware)
            .wrap(build_cors_middleware(&cors_config))
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache, no-store, must-revalidate")))
            .configure(|cfg| configure_app(cfg, &context))
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .disable_signals();

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    let server = server
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run();
    info!("Server listening on http://{}", bind_address);

    let handle = server.handle();
    tokio::select! {
        res = server => {
            res.context("HTTP server terminated with an error")?;
            if let Err(e) = storage_for_shutdown.close().await {
                tracing::error!("Failed to close storage: {}", e);
            }
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            lifetime::shutdown::perform_shutdown(handle, storage_for_shutdown).await;
            warn!("Graceful shutdown: all tasks completed");
        }
    }

    Ok(())
}
