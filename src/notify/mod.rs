//! User-facing notices.
//!
//! The HTTP client and stores publish notices here instead of talking to a
//! UI directly. Front ends subscribe and render them as dialogs or toasts.

use serde::Serialize;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Notice {
    /// A dialog or toast.
    Message {
        level: NoticeLevel,
        title: String,
        description: String,
    },
    /// The session ended; the front end should return to its login screen.
    SessionExpired,
}

impl Notice {
    pub fn message(level: NoticeLevel, title: impl Into<String>, description: impl Into<String>) -> Self {
        Notice::Message {
            level,
            title: title.into(),
            description: description.into(),
        }
    }

    pub fn level(&self) -> NoticeLevel {
        match self {
            Notice::Message { level, .. } => *level,
            Notice::SessionExpired => NoticeLevel::Warning,
        }
    }
}

/// Fan-out of notices to any number of subscribers.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    /// Publish a notice. Having no subscribers is fine; the notice is logged
    /// either way.
    pub fn publish(&self, notice: Notice) {
        match &notice {
            Notice::Message {
                level: NoticeLevel::Error,
                title,
                description,
            } => tracing::error!(%title, %description, "notice"),
            Notice::Message {
                level: NoticeLevel::Warning,
                title,
                description,
            } => tracing::warn!(%title, %description, "notice"),
            Notice::Message {
                title, description, ..
            } => tracing::info!(%title, %description, "notice"),
            Notice::SessionExpired => tracing::warn!("Session expired, login required"),
        }
        let _ = self.tx.send(notice);
    }
}
