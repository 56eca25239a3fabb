//! Service layer for business logic
//!
//! HTTP handlers stay thin; the rules for keys, loggers and redirects live here.

pub mod auth;
mod key_service;
mod logger_service;
pub mod mailer;
mod redirect;

pub use auth::{ApiKeyAuthorizer, PlainKeyAuthorizer};
pub use key_service::*;
pub use logger_service::*;
pub use mailer::{LogMailer, Mailer, SmtpMailer, build_mailer};
pub use redirect::*;
