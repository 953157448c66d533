//! User-visible notifications raised by actions.

use serde::Serialize;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
}

impl Notification {
    pub fn success(message: &str, txid: &str) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.to_string(),
            description: None,
            txid: Some(txid.to_string()),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.to_string(),
            description: None,
            txid: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_txid(mut self, txid: Option<&str>) -> Self {
        self.txid = txid.map(str::to_string);
        self
    }
}

/// Pending notifications, oldest first, until the host drains them.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: Vec<Notification>,
}

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        match notification.kind {
            NotificationKind::Error => error!(
                message = %notification.message,
                description = notification.description.as_deref().unwrap_or(""),
                txid = notification.txid.as_deref().unwrap_or(""),
                "notify"
            ),
            NotificationKind::Success => info!(
                message = %notification.message,
                txid = notification.txid.as_deref().unwrap_or(""),
                "notify"
            ),
        }
        self.queue.push(notification);
    }

    pub fn last(&self) -> Option<&Notification> {
        self.queue.last()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.queue)
    }
}
