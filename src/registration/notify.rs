//! Notification and navigation surfaces driven by the registration flow.

use serde::Serialize;
use std::sync::Mutex;

/// Path the browser is sent to after a successful registration
pub const APPLICATION_ROOT: &str = "/";

/// Visual severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// A user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

/// Fire-and-forget notification surface
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Navigation surface
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

/// One side effect seen by a [`RecordingSurface`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEvent {
    Notified(Notification),
    Navigated(String),
}

/// Surface that keeps every notification and navigation request in order.
///
/// Request handlers use it to turn the controller's side effects into a
/// response after the submission finishes.
#[derive(Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every notification and navigation so far, interleaved as they happened
    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Notifications emitted so far
    pub fn notifications(&self) -> Vec<Notification> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Notified(notification) => Some(notification),
                SurfaceEvent::Navigated(_) => None,
            })
            .collect()
    }

    /// Paths navigated to so far
    pub fn navigations(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SurfaceEvent::Navigated(path) => Some(path),
                SurfaceEvent::Notified(_) => None,
            })
            .collect()
    }

    /// The most recent notification, which is the one a page shows
    pub fn last_notification(&self) -> Option<Notification> {
        self.notifications().pop()
    }

    /// The most recent navigation target
    pub fn redirect(&self) -> Option<String> {
        self.navigations().pop()
    }

    fn record(&self, event: SurfaceEvent) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(err) => tracing::error!(error = %err, "recording surface poisoned"),
        }
    }
}

impl Notifier for RecordingSurface {
    fn notify(&self, notification: Notification) {
        self.record(SurfaceEvent::Notified(notification));
    }
}

impl Navigator for RecordingSurface {
    fn navigate_to(&self, path: &str) {
        self.record(SurfaceEvent::Navigated(path.to_string()));
    }
}
