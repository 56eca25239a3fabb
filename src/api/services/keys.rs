//! API key issuance endpoint

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{Responder, web};
use tracing::info;

use super::helpers::{
    EmailForm, FormOrJson, body_or_default, error_body, error_response, message_response,
};
use crate::services::{KeyIssue, KeyService};

pub struct KeyApi;

impl KeyApi {
    /// POST /api/getApiKey
    pub async fn get_api_key(
        body: FormOrJson<EmailForm>,
        keys: web::Data<Arc<KeyService>>,
    ) -> impl Responder {
        let form = body_or_default(body);

        match keys.issue_key(&form.email).await {
            Ok(KeyIssue::Issued(_)) => {
                message_response(StatusCode::OK, "ApiKey sent to your email")
            }
            Ok(KeyIssue::Resent(_)) => {
                info!("API key resent to {}", form.email);
                error_body(
                    StatusCode::BAD_REQUEST,
                    "User already has an apiKey, it was resent by email",
                )
            }
            Err(e) => error_response(&e),
        }
    }
}
