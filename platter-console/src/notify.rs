//! Notification bus
//!
//! Publish/subscribe surface for the toasts the UI renders. Every
//! mutating operation in this crate emits exactly one terminal event
//! (success or error) per invocation attempt.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

/// Broadcast channel of UI notifications. Cloning shares the channel;
/// emission never blocks and never fails when nobody is listening.
#[derive(Debug, Clone)]
pub struct NotificationBus {
    tx: broadcast::Sender<Notification>,
}

impl NotificationBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(NotificationKind::Success, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(NotificationKind::Error, message.into());
    }

    fn emit(&self, kind: NotificationKind, message: String) {
        tracing::debug!(?kind, %message, "notification");
        // send() errors only when there are no receivers; that is fine.
        let _ = self.tx.send(Notification { kind, message });
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new()
    }
}
