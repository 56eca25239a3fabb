//! Outbound mail delivery
//!
//! Key issuance hands a finished message to a [`Mailer`]. Production uses
//! [`SmtpMailer`] (lettre over STARTTLS); when no SMTP account is configured
//! the server falls back to [`LogMailer`].

use std::sync::Arc;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info, warn};

use crate::config::MailConfig;
use crate::errors::{IpShorterError, Result};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_mailbox: Mailbox,
}

impl SmtpMailer {
    /// Build the transport. The connection is opened lazily on first send.
    pub fn new(config: &MailConfig) -> Result<Self> {
        let from_mailbox: Mailbox = config.from_address.parse().map_err(|e| {
            IpShorterError::mail_config(format!(
                "invalid from address '{}': {}",
                config.from_address, e
            ))
        })?;

        let builder = if config.use_tls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host).map_err(
                |e| IpShorterError::mail_config(format!("invalid SMTP relay: {}", e)),
            )?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };

        let mut builder = builder.port(config.smtp_port);
        if let Some(username) = config.username.as_ref().filter(|u| !u.is_empty()) {
            let password = config.password.clone().unwrap_or_default();
            builder = builder.credentials(Credentials::new(username.clone(), password));
        }

        debug!(
            "SMTP mailer initialized: {}:{} (tls: {})",
            config.smtp_host, config.smtp_port, config.use_tls
        );

        Ok(Self {
            transport: builder.build(),
            from_mailbox,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        let to_mailbox: Mailbox = to
            .parse()
            .map_err(|e| IpShorterError::delivery(format!("invalid recipient {}: {}", to, e)))?;

        let message = Message::builder()
            .from(self.from_mailbox.clone())
            .to(to_mailbox)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| IpShorterError::delivery(format!("failed to build message: {}", e)))?;

        self.transport.send(message).await.map_err(|e| {
            warn!("Failed to send mail to {}: {}", to, e);
            IpShorterError::delivery(format!("failed to send email to {}", to))
        })?;

        info!("Mail sent to {}", to);
        Ok(())
    }
}

/// Writes outgoing mail to the log instead of delivering it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        info!("SMTP not configured, mail to {} not delivered ({})", to, subject);
        debug!("Undelivered mail body: {}", html_body);
        Ok(())
    }
}

/// Pick the mailer for this configuration.
pub fn build_mailer(config: &MailConfig) -> Result<Arc<dyn Mailer>> {
    if config.is_configured() {
        Ok(Arc::new(SmtpMailer::new(config)?))
    } else {
        warn!("Mail account not configured, API keys will only be logged");
        Ok(Arc::new(LogMailer))
    }
}
