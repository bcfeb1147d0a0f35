//! View-model stand-ins for the dashboard's form controls.
//!
//! Each control keeps the state a page element would show (options, label,
//! disabled flag) so a front end can render it and tests can inspect it.

use std::sync::Mutex;

use shared::{
    domain::ChannelId,
    protocol::{BotStatus, Channel},
};

use crate::{channels::ChannelConsumer, lock, status::ControlToggle, status::StatusObserver};

pub const DEFAULT_CHANNEL_PLACEHOLDER: &str = "// Select a channel";
pub const UNCATEGORIZED: &str = "Uncategorized";
const STAT_PLACEHOLDER: &str = "---";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitLabels {
    pub idle: &'static str,
    pub busy: &'static str,
}

#[derive(Debug)]
struct ButtonState {
    label: &'static str,
    busy: bool,
    enabled: bool,
}

/// Submit control of one form. Busy while a submission is in flight, and
/// disabled while the bot is reported offline.
#[derive(Debug)]
pub struct SubmitButton {
    labels: SubmitLabels,
    state: Mutex<ButtonState>,
}

impl SubmitButton {
    pub fn new(labels: SubmitLabels) -> Self {
        Self {
            labels,
            state: Mutex::new(ButtonState {
                label: labels.idle,
                busy: false,
                enabled: true,
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        lock(&self.state).label
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.state).busy
    }

    pub fn is_disabled(&self) -> bool {
        let state = lock(&self.state);
        state.busy || !state.enabled
    }

    /// Marks the button busy unless it is already disabled. The returned guard
    /// restores the idle label when dropped.
    pub(crate) fn begin(&self) -> Option<BusyGuard<'_>> {
        let mut state = lock(&self.state);
        if state.busy || !state.enabled {
            return None;
        }
        state.busy = true;
        state.label = self.labels.busy;
        Some(BusyGuard { button: self })
    }
}

impl ControlToggle for SubmitButton {
    fn set_enabled(&self, enabled: bool) {
        lock(&self.state).enabled = enabled;
    }
}

pub(crate) struct BusyGuard<'a> {
    button: &'a SubmitButton,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock(&self.button.state);
        state.busy = false;
        state.label = self.button.labels.idle;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug)]
struct SelectState {
    options: Vec<SelectOption>,
    selected: String,
    disabled: bool,
}

/// Channel picker: a placeholder followed by one option per channel.
#[derive(Debug)]
pub struct ChannelSelect {
    placeholder: String,
    state: Mutex<SelectState>,
}

impl Default for ChannelSelect {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_PLACEHOLDER)
    }
}

impl ChannelSelect {
    pub fn new(placeholder: impl Into<String>) -> Self {
        let placeholder = placeholder.into();
        Self {
            state: Mutex::new(SelectState {
                options: vec![placeholder_option(&placeholder)],
                selected: String::new(),
                disabled: true,
            }),
            placeholder,
        }
    }

    pub fn options(&self) -> Vec<SelectOption> {
        lock(&self.state).options.clone()
    }

    pub fn is_disabled(&self) -> bool {
        lock(&self.state).disabled
    }

    /// Selected channel, `None` while the placeholder is selected.
    pub fn value(&self) -> Option<ChannelId> {
        let state = lock(&self.state);
        (!state.selected.is_empty()).then(|| ChannelId::new(state.selected.clone()))
    }

    /// Selects `value` if it is one of the current options. An empty value
    /// selects the placeholder.
    pub fn select(&self, value: &str) -> bool {
        let mut state = lock(&self.state);
        if value.is_empty() {
            state.selected.clear();
            return true;
        }
        if state.options.iter().skip(1).any(|option| option.value == value) {
            state.selected = value.to_string();
            true
        } else {
            false
        }
    }
}

fn placeholder_option(placeholder: &str) -> SelectOption {
    SelectOption {
        value: String::new(),
        label: placeholder.to_string(),
    }
}

impl ChannelConsumer for ChannelSelect {
    fn rebuild(&self, channels: &[Channel]) {
        let mut options = Vec::with_capacity(channels.len() + 1);
        options.push(placeholder_option(&self.placeholder));
        options.extend(channels.iter().map(|channel| SelectOption {
            value: channel.id.to_string(),
            label: format!("# {}", channel.name),
        }));

        let mut state = lock(&self.state);
        if !options.iter().skip(1).any(|o| o.value == state.selected) {
            state.selected.clear();
        }
        state.options = options;
    }
}

impl ControlToggle for ChannelSelect {
    fn set_enabled(&self, enabled: bool) {
        lock(&self.state).disabled = !enabled;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelGroup {
    pub category: String,
    pub channels: Vec<Channel>,
}

/// Channel list split into groups wherever the category changes.
#[derive(Debug, Default)]
pub struct GroupedChannelList {
    groups: Mutex<Vec<ChannelGroup>>,
}

impl GroupedChannelList {
    pub fn groups(&self) -> Vec<ChannelGroup> {
        lock(&self.groups).clone()
    }
}

impl ChannelConsumer for GroupedChannelList {
    fn rebuild(&self, channels: &[Channel]) {
        let mut groups: Vec<ChannelGroup> = Vec::new();
        for channel in channels {
            let category = channel.category.as_deref().unwrap_or(UNCATEGORIZED);
            match groups.last_mut() {
                Some(group) if group.category == category => group.channels.push(channel.clone()),
                _ => groups.push(ChannelGroup {
                    category: category.to_string(),
                    channels: vec![channel.clone()],
                }),
            }
        }
        *lock(&self.groups) = groups;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusDot {
    Unknown,
    Online,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPanelView {
    pub dot: StatusDot,
    pub text: &'static str,
    pub guild_count: String,
    pub latency: String,
    pub bot_user: String,
    pub badge: &'static str,
}

impl Default for StatusPanelView {
    fn default() -> Self {
        Self {
            dot: StatusDot::Unknown,
            text: "CONNECTING",
            guild_count: STAT_PLACEHOLDER.to_string(),
            latency: format!("{STAT_PLACEHOLDER} ms"),
            bot_user: STAT_PLACEHOLDER.to_string(),
            badge: "Waiting for bot...",
        }
    }
}

/// Status block: indicator dot, ONLINE/OFFLINE text, stats and the composer
/// badge. Stats are only refreshed while the bot is online.
#[derive(Debug, Default)]
pub struct StatusPanel {
    view: Mutex<StatusPanelView>,
}

impl StatusPanel {
    pub fn view(&self) -> StatusPanelView {
        lock(&self.view).clone()
    }
}

impl StatusObserver for StatusPanel {
    fn on_status(&self, status: &BotStatus) {
        let mut view = lock(&self.view);
        if status.online {
            view.dot = StatusDot::Online;
            view.text = "ONLINE";
            view.badge = "Bot online";
            view.guild_count = status
                .guild_count
                .map_or_else(|| STAT_PLACEHOLDER.to_string(), |count| count.to_string());
            view.latency = match status.latency_ms {
                Some(latency) => format!("{latency} ms"),
                None => format!("{STAT_PLACEHOLDER} ms"),
            };
            view.bot_user = status
                .bot_user
                .clone()
                .unwrap_or_else(|| STAT_PLACEHOLDER.to_string());
        } else {
            view.dot = StatusDot::Offline;
            view.text = "OFFLINE";
            view.badge = "Waiting for bot...";
        }
    }
}

#[cfg(test)]
#[path = "tests/controls_tests.rs"]
mod tests;
