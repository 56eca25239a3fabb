//! Redirect and visit recording
//!
//! The destination is resolved before responding; the click counter and
//! visitor history are written afterwards on a detached task, so a storage
//! failure there never delays or changes the redirect.

use std::sync::Arc;

use actix_web::http::header::HeaderValue;
use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::errors::{IpShorterError, Result};
use crate::storage::{LoggerStore, Visitor};

/// Where to send the client, plus the still-running recording task.
///
/// Handlers drop `recording`; tests await it to observe the writes.
pub struct VisitOutcome {
    pub url: String,
    pub recording: JoinHandle<()>,
}

pub struct RedirectService {
    loggers: Arc<dyn LoggerStore>,
}

impl RedirectService {
    pub fn new(loggers: Arc<dyn LoggerStore>) -> Self {
        Self { loggers }
    }

    /// Resolve `id` and start recording the visit.
    ///
    /// An unknown id returns the lookup error and writes nothing. So does a
    /// stored url that cannot be sent as a `Location` header.
    pub async fn redirect(&self, id: &str, ips: Vec<String>) -> Result<VisitOutcome> {
        let url = self.loggers.find_url_by_id(id).await?;
        if HeaderValue::from_bytes(url.as_bytes()).is_err() {
            return Err(IpShorterError::validation(format!(
                "logger {} has an unusable destination",
                id
            )));
        }

        let visitor = Visitor {
            ips,
            clicked_at: Utc::now(),
        };
        let recording = tokio::spawn(record_visit(
            Arc::clone(&self.loggers),
            id.to_string(),
            visitor,
        ));

        Ok(VisitOutcome { url, recording })
    }
}

/// Two independent writes; neither failure is reported to the client.
///
/// A logger deleted since the lookup gets no visitor row.
async fn record_visit(loggers: Arc<dyn LoggerStore>, id: String, visitor: Visitor) {
    match loggers.increment_clicks(&id).await {
        Ok(()) => {}
        Err(IpShorterError::NotFound(_)) => {
            debug!("Logger {} deleted before its visit was recorded", id);
            return;
        }
        Err(e) => warn!("Failed to increment clicks for {}: {}", id, e),
    }
    if let Err(e) = loggers.append_visitor(&id, &visitor).await {
        warn!("Failed to record visitor for {}: {}", id, e);
    }
    debug!("Visit recorded for {}", id);
}
