use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, error, warn};

use super::helpers::error_body;
use crate::errors::IpShorterError;
use crate::services::RedirectService;
use crate::utils::ip::extract_requester_ips;

const RESOLVE_FAILED: &str = "error getting the destination url";

pub struct RedirectApi;

impl RedirectApi {
    /// GET /{id}
    ///
    /// 先返回 302，点击与访客记录在后台任务中写入。
    pub async fn handle_redirect(
        req: HttpRequest,
        path: web::Path<String>,
        redirect: web::Data<Arc<RedirectService>>,
    ) -> impl Responder {
        let id = path.into_inner();
        let ips = extract_requester_ips(&req);

        match redirect.redirect(&id, ips).await {
            Ok(outcome) => HttpResponse::build(StatusCode::FOUND)
                .insert_header(("Location", outcome.url))
                .finish(),
            Err(IpShorterError::NotFound(_)) => {
                debug!("Redirect target not found: {}", id);
                error_body(StatusCode::BAD_REQUEST, RESOLVE_FAILED)
            }
            Err(IpShorterError::Validation(msg)) => {
                warn!("Refusing redirect for {}: {}", id, msg);
                error_body(StatusCode::BAD_REQUEST, RESOLVE_FAILED)
            }
            Err(e) => {
                error!("Database error during redirect lookup: {}", e);
                error_body(StatusCode::BAD_REQUEST, RESOLVE_FAILED)
            }
        }
    }
}

/// Redirect 路由配置，需在 `/api` 之后注册
pub fn redirect_routes() -> actix_web::Scope {
    web::scope("").route("/{id}", web::get().to(RedirectApi::handle_redirect))
}
