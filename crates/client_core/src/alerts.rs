use std::{
    fmt,
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use chrono::{DateTime, Utc};
use shared::domain::AlertLevel;
use tokio::{sync::broadcast, task::JoinHandle};
use tracing::debug;
use uuid::Uuid;

use crate::lock;

/// How long a banner stays up without manual dismissal.
pub const ALERT_DISPLAY_WINDOW: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlertId(Uuid);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRecord {
    pub id: AlertId,
    pub text: String,
    pub level: AlertLevel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertEvent {
    Shown(AlertRecord),
    Removed(AlertId),
}

struct ActiveAlert {
    record: AlertRecord,
    expiry: JoinHandle<()>,
}

struct AlertState {
    alerts: Mutex<Vec<ActiveAlert>>,
    events: broadcast::Sender<AlertEvent>,
}

impl AlertState {
    fn take(&self, id: AlertId) -> Option<ActiveAlert> {
        let mut alerts = lock(&self.alerts);
        let index = alerts.iter().position(|alert| alert.record.id == id)?;
        Some(alerts.remove(index))
    }

    fn expire(&self, id: AlertId) {
        if self.take(id).is_some() {
            debug!(alert_id = %id, "alert expired");
            let _ = self.events.send(AlertEvent::Removed(id));
        }
    }
}

/// Fixed container of transient banners. Cloning shares the container.
#[derive(Clone)]
pub struct AlertNotifier {
    state: Arc<AlertState>,
}

impl Default for AlertNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertNotifier {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            state: Arc::new(AlertState {
                alerts: Mutex::new(Vec::new()),
                events,
            }),
        }
    }

    /// Appends a banner and schedules its removal. Must be called from within
    /// a tokio runtime.
    pub fn show(&self, text: impl Into<String>, level: AlertLevel) -> AlertId {
        let record = AlertRecord {
            id: AlertId(Uuid::new_v4()),
            text: text.into(),
            level,
            created_at: Utc::now(),
        };
        let id = record.id;
        debug!(alert_id = %id, level = level.as_str(), text = %record.text, "alert shown");

        let weak: Weak<AlertState> = Arc::downgrade(&self.state);
        {
            let mut alerts = lock(&self.state.alerts);
            let expiry = tokio::spawn(async move {
                tokio::time::sleep(ALERT_DISPLAY_WINDOW).await;
                if let Some(state) = weak.upgrade() {
                    state.expire(id);
                }
            });
            alerts.push(ActiveAlert {
                record: record.clone(),
                expiry,
            });
        }

        let _ = self.state.events.send(AlertEvent::Shown(record));
        id
    }

    pub fn info(&self, text: impl Into<String>) -> AlertId {
        self.show(text, AlertLevel::Info)
    }

    pub fn success(&self, text: impl Into<String>) -> AlertId {
        self.show(text, AlertLevel::Success)
    }

    pub fn warning(&self, text: impl Into<String>) -> AlertId {
        self.show(text, AlertLevel::Warning)
    }

    pub fn danger(&self, text: impl Into<String>) -> AlertId {
        self.show(text, AlertLevel::Danger)
    }

    /// Removes a banner before its window elapses. Returns `false` if it was
    /// already gone.
    pub fn dismiss(&self, id: AlertId) -> bool {
        let Some(alert) = self.state.take(id) else {
            return false;
        };
        alert.expiry.abort();
        debug!(alert_id = %id, "alert dismissed");
        let _ = self.state.events.send(AlertEvent::Removed(id));
        true
    }

    /// Banners currently on screen, oldest first.
    pub fn active(&self) -> Vec<AlertRecord> {
        lock(&self.state.alerts)
            .iter()
            .map(|alert| alert.record.clone())
            .collect()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AlertEvent> {
        self.state.events.subscribe()
    }
}

impl Drop for AlertState {
    fn drop(&mut self) {
        let alerts = self.alerts.get_mut().unwrap_or_else(|e| e.into_inner());
        for alert in alerts.drain(..) {
            alert.expiry.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/alerts_tests.rs"]
mod tests;
