//! Logger management endpoints under `/api`

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{Responder, web};

use super::helpers::{
    FormOrJson, UrlForm, api_result, body_or_default, error_response, message_response,
};
use super::keys::KeyApi;
use crate::services::LoggerService;

pub struct LoggerApi;

impl LoggerApi {
    /// POST /api/createLogger/{apiKey}
    pub async fn create_logger(
        path: web::Path<String>,
        body: FormOrJson<UrlForm>,
        service: web::Data<Arc<LoggerService>>,
    ) -> impl Responder {
        let api_key = path.into_inner();
        let form = body_or_default(body);
        api_result(service.create_logger(&api_key, &form.url).await)
    }

    /// GET /api/getLoggers/{apiKey}
    pub async fn get_loggers(
        path: web::Path<String>,
        service: web::Data<Arc<LoggerService>>,
    ) -> impl Responder {
        api_result(service.list_loggers(&path.into_inner()).await)
    }

    /// GET /api/getLogger/{apiKey}/{id}
    pub async fn get_logger(
        path: web::Path<(String, String)>,
        service: web::Data<Arc<LoggerService>>,
    ) -> impl Responder {
        let (api_key, id) = path.into_inner();
        api_result(service.get_logger(&api_key, &id).await)
    }

    /// DELETE /api/deleteLogger/{apiKey}/{id}
    pub async fn delete_logger(
        path: web::Path<(String, String)>,
        service: web::Data<Arc<LoggerService>>,
    ) -> impl Responder {
        let (api_key, id) = path.into_inner();
        match service.delete_logger(&api_key, &id).await {
            Ok(()) => message_response(StatusCode::OK, "logger deleted"),
            Err(e) => error_response(&e),
        }
    }

    /// GET /api/dashboard/{apiKey}/{id}
    pub async fn dashboard(
        path: web::Path<(String, String)>,
        service: web::Data<Arc<LoggerService>>,
    ) -> impl Responder {
        let (api_key, id) = path.into_inner();
        api_result(service.dashboard(&api_key, &id).await)
    }

    /// GET /api/shared/{token}
    pub async fn shared_dashboard(
        path: web::Path<String>,
        service: web::Data<Arc<LoggerService>>,
    ) -> impl Responder {
        api_result(service.shared_dashboard(&path.into_inner()).await)
    }
}

/// API 路由配置 `/api`
///
/// 包含：
/// - POST /getApiKey - 申请或重发 API key
/// - POST /createLogger/{apiKey} - 创建 logger
/// - GET /getLoggers/{apiKey} - 列出 logger
/// - GET /getLogger/{apiKey}/{id} - 获取单个 logger
/// - DELETE /deleteLogger/{apiKey}/{id} - 删除 logger
/// - GET /dashboard/{apiKey}/{id} - 仪表盘
/// - GET /shared/{token} - 只读共享仪表盘
pub fn api_routes() -> actix_web::Scope {
    web::scope("/api")
        .route("/getApiKey", web::post().to(KeyApi::get_api_key))
        .route("/createLogger/{api_key}", web::post().to(LoggerApi::create_logger))
        .route("/getLoggers/{api_key}", web::get().to(LoggerApi::get_loggers))
        .route("/getLogger/{api_key}/{id}", web::get().to(LoggerApi::get_logger))
        .route(
            "/deleteLogger/{api_key}/{id}",
            web::delete().to(LoggerApi::delete_logger),
        )
        .route("/dashboard/{api_key}/{id}", web::get().to(LoggerApi::dashboard))
        .route("/shared/{token}", web::get().to(LoggerApi::shared_dashboard))
}
