//! Traveller notification collaborator
//!
//! Fire-and-forget: the service requests one notification on the
//! draft→published edge and logs (never propagates) a failure. A mailer
//! without configuration, or a trip without a contact address, is a
//! silent no-op rather than an error.

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::model::Trip;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Notify the trip's contact that the itinerary has been published.
    async fn send_published(&self, trip: &Trip) -> Result<()>;
}

/// Mailer configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// Sender address, `TRIPDESK_NOTIFY_FROM`.
    pub sender: String,
}

impl MailerConfig {
    /// `None` when the variable is unset or blank — which downgrades the
    /// mailer to a no-op.
    pub fn from_env() -> Option<Self> {
        let sender = std::env::var("TRIPDESK_NOTIFY_FROM").ok()?;
        if sender.trim().is_empty() {
            return None;
        }
        Some(Self { sender })
    }
}

/// The shipped mailer: logs deliveries instead of speaking SMTP. Real
/// delivery is a deployment concern behind the same trait.
#[derive(Debug, Clone, Default)]
pub struct LogMailer {
    config: Option<MailerConfig>,
}

impl LogMailer {
    pub fn new(config: Option<MailerConfig>) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(MailerConfig::from_env())
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_published(&self, trip: &Trip) -> Result<()> {
        let Some(config) = &self.config else {
            debug!(trip = %trip.id, "notification skipped: mailer not configured");
            return Ok(());
        };
        if trip.contact_email.trim().is_empty() {
            debug!(trip = %trip.id, "notification skipped: no contact email");
            return Ok(());
        }
        info!(
            trip = %trip.id,
            to = %trip.contact_email,
            from = %config.sender,
            "trip published notification sent"
        );
        Ok(())
    }
}
