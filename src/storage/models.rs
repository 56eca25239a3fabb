use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An email address bound to exactly one API key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    pub email: String,
    pub api_key: String,
}

/// One recorded visit. Never mutated once appended to a logger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visitor {
    pub ips: Vec<String>,
    pub clicked_at: DateTime<Utc>,
}

/// A short link plus the analytics accumulated by redirects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Logger {
    pub id: String,
    pub url: String,
    pub dashboard: String,
    pub api_key: String,
    #[serde(default)]
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub visitors: Vec<Visitor>,
}

impl Logger {
    /// A fresh logger with no analytics yet.
    pub fn new(id: String, url: String, dashboard: String, api_key: String) -> Self {
        Self {
            id,
            url,
            dashboard,
            api_key,
            clicks: 0,
            created_at: Utc::now(),
            visitors: Vec::new(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StorageConfig {
    pub storage_type: String,
}
