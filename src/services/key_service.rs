//! API key issuance
//!
//! An email address is bound to exactly one API key. Asking again for the
//! same address resends the existing key instead of minting a new one.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::errors::{IpShorterError, Result};
use crate::services::mailer::Mailer;
use crate::storage::{Owner, OwnerDirectory};
use crate::utils::generate_token;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email regex is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Outcome of a key request. Both variants carry the key that was mailed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyIssue {
    Issued(String),
    Resent(String),
}

impl KeyIssue {
    pub fn api_key(&self) -> &str {
        match self {
            KeyIssue::Issued(key) | KeyIssue::Resent(key) => key,
        }
    }
}

pub struct KeyService {
    owners: Arc<dyn OwnerDirectory>,
    mailer: Arc<dyn Mailer>,
    subject: String,
}

impl KeyService {
    pub fn new(owners: Arc<dyn OwnerDirectory>, mailer: Arc<dyn Mailer>, subject: String) -> Self {
        Self {
            owners,
            mailer,
            subject,
        }
    }

    /// Look up or create the owner for `email` and mail the key.
    ///
    /// The owner row is written before delivery, so a failed send can be
    /// recovered by asking again.
    pub async fn issue_key(&self, email: &str) -> Result<KeyIssue> {
        if !is_valid_email(email) {
            return Err(IpShorterError::validation("Invalid email"));
        }

        let issue = match self.owners.find_by_email(email).await? {
            Some(owner) => KeyIssue::Resent(owner.api_key),
            None => {
                let owner = Owner {
                    email: email.to_string(),
                    api_key: generate_token(),
                };
                self.owners.create(&owner).await?;
                info!("API key issued for {}", email);
                KeyIssue::Issued(owner.api_key)
            }
        };

        let body = format!("This is your ApiKey <b>{}</b>", issue.api_key());
        self.mailer.send(email, &self.subject, &body).await?;

        Ok(issue)
    }
}
