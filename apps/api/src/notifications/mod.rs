//! Reminder scheduling. Delivery itself happens on the device; this side only
//! hands out ids and records what was asked for. Callers treat every failure
//! as non-fatal.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Notification scheduling unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn schedule(
        &self,
        title: &str,
        body: &str,
        trigger: DateTime<Local>,
    ) -> Result<String, NotifyError>;

    async fn cancel(&self, notification_id: &str) -> Result<(), NotifyError>;
}

/// Logs scheduling requests and returns generated ids. A trigger that has
/// already passed cannot be delivered and is refused.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn schedule(
        &self,
        title: &str,
        body: &str,
        trigger: DateTime<Local>,
    ) -> Result<String, NotifyError> {
        if trigger <= Local::now() {
            return Err(NotifyError::Unavailable(format!(
                "trigger {trigger} is in the past"
            )));
        }
        let id = uuid::Uuid::new_v4().to_string();
        info!(notification_id = %id, %trigger, "Scheduled reminder '{title}': {body}");
        Ok(id)
    }

    async fn cancel(&self, notification_id: &str) -> Result<(), NotifyError> {
        info!(notification_id, "Cancelled reminder");
        Ok(())
    }
}
