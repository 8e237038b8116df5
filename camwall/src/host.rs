//! Host capabilities the controller reports through
//!
//! Navigation and user-visible notifications belong to whatever embeds the
//! grid. The log-backed implementations are used when the builder is given
//! nothing else; the recording ones are for tests and demos.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{error, info};

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation completed
    Info,
    /// Operation failed
    Error,
}

/// Message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Message text
    pub message: String,
}

impl Notification {
    /// Informational notification
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }

    /// Error notification
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Moves the host to another view
pub trait Navigator: Send + Sync {
    /// Navigate to `path`
    fn navigate(&self, path: &str);
}

/// Shows notifications to the user
pub trait Notifier: Send + Sync {
    /// Show `notification`
    fn notify(&self, notification: Notification);
}

/// Navigator that only logs the target
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, path: &str) {
        info!("Navigate to {}", path);
    }
}

/// Notifier that writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Info => info!("{}", notification.message),
            NotificationLevel::Error => error!("{}", notification.message),
        }
    }
}

/// Navigator that keeps every target it was sent to
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    paths: Arc<Mutex<Vec<String>>>,
}

impl RecordingNavigator {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Targets in navigation order
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().clone()
    }

    /// Most recent target
    pub fn last(&self) -> Option<String> {
        self.paths.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.paths.lock().push(path.to_string());
    }
}

/// Notifier that keeps every notification
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    notifications: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications in arrival order
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().clone()
    }

    /// Only the error notifications
    pub fn errors(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .cloned()
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().push(notification);
    }
}
