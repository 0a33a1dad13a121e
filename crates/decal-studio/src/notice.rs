use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// A user-facing message about the outcome of an operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: chrono::DateTime<chrono::Utc>,
}

/// Shared queue of notices the host drains and displays.
#[derive(Clone, Debug, Default)]
pub struct NoticeLog {
    entries: Arc<Mutex<Vec<Notice>>>,
}

impl NoticeLog {
    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            NoticeLevel::Error => tracing::warn!(%message, "Notice"),
            _ => tracing::info!(?level, %message, "Notice"),
        }
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Notice {
                level,
                message,
                at: chrono::Utc::now(),
            });
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Info, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Success, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NoticeLevel::Error, message);
    }

    /// Removes and returns every pending notice, oldest first.
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
