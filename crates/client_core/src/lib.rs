//! Headless client for the bot dashboard: backend API access plus the
//! view-state machinery behind the dashboard pages.

use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod alerts;
pub mod api;
pub mod channels;
pub mod config;
pub mod controls;
pub mod dashboard;
pub mod embed;
pub mod error;
pub mod events;
pub mod forms;
pub mod status;

pub use alerts::{AlertEvent, AlertId, AlertNotifier, AlertRecord, ALERT_DISPLAY_WINDOW};
pub use api::{DashboardApi, EventKind, HttpDashboardApi};
pub use channels::{ChannelConsumer, ChannelDirectory, ChannelSnapshot};
pub use config::{load_settings, load_settings_from, Settings};
pub use controls::{
    ChannelGroup, ChannelSelect, GroupedChannelList, SelectOption, StatusDot, StatusPanel,
    StatusPanelView, SubmitButton, SubmitLabels,
};
pub use dashboard::{resolve_guild, Dashboard};
pub use embed::{hex_to_decimal, render_preview, ColorField, EmbedFields, EmbedPreview};
pub use error::DashboardError;
pub use events::{
    InviteBoard, InviteBoardView, JoinConfigForm, JoinDmConfigForm, LeaderboardRow,
    LeaveConfigForm,
};
pub use forms::{
    EmbedMessageForm, FormBinder, FormKind, FormSubmissionResult, SubmitOutcome, Submission,
    TextMessageForm, ValidationError,
};
pub use status::{BotStatusPoller, ControlToggle, StatusObserver};

/// View state stays usable even if a callback panicked while holding it.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
