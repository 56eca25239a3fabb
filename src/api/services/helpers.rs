//! 响应与请求体帮助函数
//!
//! 所有错误都以 `{"error": "..."}` 返回，成功消息以 `{"message": "..."}` 返回。

use actix_web::http::StatusCode;
use actix_web::{Either, HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::errors::IpShorterError;

/// Body accepted as JSON or as an urlencoded form. `None` when neither parses.
pub type FormOrJson<T> = Option<Either<web::Json<T>, web::Form<T>>>;

#[derive(Debug, Default, Deserialize)]
pub struct EmailForm {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UrlForm {
    #[serde(default)]
    pub url: String,
}

/// Unwrap the body, treating a missing or unparsable one as empty.
pub fn body_or_default<T: Default>(body: FormOrJson<T>) -> T {
    match body {
        Some(Either::Left(json)) => json.into_inner(),
        Some(Either::Right(form)) => form.into_inner(),
        None => T::default(),
    }
}

pub fn message_response(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": message }))
}

pub fn error_body(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "error": message }))
}

/// 从 IpShorterError 构建错误响应
pub fn error_response(err: &IpShorterError) -> HttpResponse {
    let status = err.http_status();
    if status.is_server_error() {
        error!("{}", err);
    } else {
        debug!("Request rejected: {}", err);
    }
    error_body(status, err.message())
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: Result<T, IpShorterError>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(data),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[actix_web::test]
    async fn test_error_response_shape() {
        let resp = error_response(&IpShorterError::validation("url is required"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, json!({ "error": "url is required" }));
    }

    #[test]
    fn test_missing_body_is_empty() {
        let form: UrlForm = body_or_default(None);
        assert!(form.url.is_empty());
    }
}
