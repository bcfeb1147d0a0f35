use std::{
    sync::{Arc, Mutex, Weak},
    time::Duration,
};

use shared::protocol::BotStatus;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{api::DashboardApi, lock};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// A control that is only usable while the bot is online.
pub trait ControlToggle: Send + Sync {
    /// Must tolerate repeated calls with the same value.
    fn set_enabled(&self, enabled: bool);
}

/// Receives every successfully polled status.
pub trait StatusObserver: Send + Sync {
    fn on_status(&self, status: &BotStatus);
}

fn same_target<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Polls `/api/bot/status` and mirrors the result into registered controls.
///
/// A failed poll changes nothing: the last rendered state stays on screen and
/// controls are never flipped to disabled by a transient error.
pub struct BotStatusPoller {
    api: Arc<dyn DashboardApi>,
    toggles: Mutex<Vec<Arc<dyn ControlToggle>>>,
    observers: Mutex<Vec<Arc<dyn StatusObserver>>>,
    current: watch::Sender<Option<BotStatus>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl BotStatusPoller {
    pub fn new(api: Arc<dyn DashboardApi>) -> Arc<Self> {
        let (current, _) = watch::channel(None);
        Arc::new(Self {
            api,
            toggles: Mutex::new(Vec::new()),
            observers: Mutex::new(Vec::new()),
            current,
            task: Mutex::new(None),
        })
    }

    /// Registers a toggle once; it immediately receives the last known state.
    pub fn register_toggle(&self, toggle: Arc<dyn ControlToggle>) {
        {
            let mut toggles = lock(&self.toggles);
            if toggles.iter().any(|existing| same_target(existing, &toggle)) {
                return;
            }
            toggles.push(toggle.clone());
        }
        if let Some(status) = self.current() {
            toggle.set_enabled(status.online);
        }
    }

    pub fn register_observer(&self, observer: Arc<dyn StatusObserver>) {
        {
            let mut observers = lock(&self.observers);
            if observers.iter().any(|existing| same_target(existing, &observer)) {
                return;
            }
            observers.push(observer.clone());
        }
        if let Some(status) = self.current() {
            observer.on_status(&status);
        }
    }

    pub fn current(&self) -> Option<BotStatus> {
        self.current.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.current
            .borrow()
            .as_ref()
            .is_some_and(|status| status.online)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<BotStatus>> {
        self.current.subscribe()
    }

    /// One status request. Returns the observed online flag, or `None` if the
    /// poll failed and nothing was changed.
    pub async fn poll_once(&self) -> Option<bool> {
        let status = match self.api.bot_status().await {
            Ok(status) => status,
            Err(err) => {
                warn!(error = %err, "bot status poll failed; keeping previous state");
                return None;
            }
        };

        let online = status.online;
        let previous = self.current.send_replace(Some(status.clone()));
        if previous.as_ref().map(|p| p.online) != Some(online) {
            info!(online, "bot status changed");
        }

        let observers = lock(&self.observers).clone();
        for observer in &observers {
            observer.on_status(&status);
        }
        let toggles = lock(&self.toggles).clone();
        for toggle in &toggles {
            toggle.set_enabled(online);
        }

        Some(online)
    }

    /// Polls immediately, then again `interval` after each poll completes.
    /// Returns `false` if the loop was already running.
    pub fn start(self: &Arc<Self>, interval: Duration) -> bool {
        let mut task = lock(&self.task);
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            debug!("status poller already running");
            return false;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        *task = Some(tokio::spawn(async move {
            loop {
                let Some(poller) = weak.upgrade() else {
                    break;
                };
                poller.poll_once().await;
                drop(poller);
                tokio::time::sleep(interval).await;
            }
        }));
        info!(interval_ms = interval.as_millis() as u64, "status poller started");
        true
    }

    pub fn stop(&self) {
        if let Some(handle) = lock(&self.task).take() {
            handle.abort();
            info!("status poller stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.task)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for BotStatusPoller {
    fn drop(&mut self) {
        let task = self.task.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/status_tests.rs"]
mod tests;
