//! Member event configuration (join, leave, join DM) and the invite board.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use shared::{
    domain::{ChannelId, GuildId, UserId},
    protocol::{
        ConfigureResponse, InviteStats, JoinConfig, JoinDmConfig, LeaderboardEntry, LeaveConfig,
    },
};
use tracing::{debug, info, warn};

use crate::{
    api::{DashboardApi, EventKind},
    controls::{ChannelSelect, SubmitLabels},
    error::Result,
    forms::{business_outcome, FormBinder, FormKind, FormSubmissionResult, Submission, ValidationError},
    lock,
};

pub const DEFAULT_LEADERBOARD_LIMIT: u32 = 10;

const CONFIG_LABELS: SubmitLabels = SubmitLabels {
    idle: "Save",
    busy: "Saving...",
};

fn saved(message: &str) -> impl FnOnce(ConfigureResponse) -> FormSubmissionResult + '_ {
    move |_| FormSubmissionResult::succeeded(message)
}

#[async_trait]
impl Submission for JoinConfig {
    async fn submit(&self, api: &dyn DashboardApi) -> Result<FormSubmissionResult> {
        business_outcome(api.configure_join(self).await, saved("Join configuration saved"))
    }
}

#[async_trait]
impl Submission for LeaveConfig {
    async fn submit(&self, api: &dyn DashboardApi) -> Result<FormSubmissionResult> {
        business_outcome(api.configure_leave(self).await, saved("Leave configuration saved"))
    }
}

#[async_trait]
impl Submission for JoinDmConfig {
    async fn submit(&self, api: &dyn DashboardApi) -> Result<FormSubmissionResult> {
        business_outcome(
            api.configure_join_dm(self).await,
            saved("Join DM configuration saved"),
        )
    }
}

fn select_stored_channel(select: &ChannelSelect, kind: EventKind, channel_id: Option<&ChannelId>) {
    let value = channel_id.map(ChannelId::as_str).unwrap_or_default();
    if !select.select(value) {
        warn!(
            event = kind.path_segment(),
            channel_id = value,
            "stored channel is not in the channel directory"
        );
    }
}

pub struct JoinConfigForm {
    guild_id: GuildId,
    channel: Arc<ChannelSelect>,
    pub enabled: bool,
    pub message_template: String,
    pub embed_enabled: bool,
}

impl JoinConfigForm {
    pub fn new(guild_id: GuildId, channel: Arc<ChannelSelect>) -> Self {
        Self {
            guild_id,
            channel,
            enabled: false,
            message_template: String::new(),
            embed_enabled: false,
        }
    }

    pub fn channel(&self) -> &Arc<ChannelSelect> {
        &self.channel
    }

    pub fn apply(&mut self, config: &JoinConfig) {
        self.enabled = config.enabled;
        self.message_template = config.message_template.clone();
        self.embed_enabled = config.embed_enabled;
        select_stored_channel(&self.channel, EventKind::Join, config.channel_id.as_ref());
    }
}

impl FormKind for JoinConfigForm {
    type Request = JoinConfig;

    const NAME: &'static str = "join-config";
    const LABELS: SubmitLabels = CONFIG_LABELS;
    const TRANSPORT_FAILURE: &'static str = "Error saving configuration";

    fn collect(&self) -> std::result::Result<JoinConfig, ValidationError> {
        let Some(channel_id) = self.channel.value() else {
            return Err(ValidationError("Please select a channel for join messages"));
        };
        Ok(JoinConfig {
            guild_id: self.guild_id.clone(),
            enabled: self.enabled,
            channel_id: Some(channel_id),
            message_template: self.message_template.clone(),
            embed_enabled: self.embed_enabled,
        })
    }
}

pub struct LeaveConfigForm {
    guild_id: GuildId,
    channel: Arc<ChannelSelect>,
    pub enabled: bool,
    pub message_template: String,
}

impl LeaveConfigForm {
    pub fn new(guild_id: GuildId, channel: Arc<ChannelSelect>) -> Self {
        Self {
            guild_id,
            channel,
            enabled: false,
            message_template: String::new(),
        }
    }

    pub fn channel(&self) -> &Arc<ChannelSelect> {
        &self.channel
    }

    pub fn apply(&mut self, config: &LeaveConfig) {
        self.enabled = config.enabled;
        self.message_template = config.message_template.clone();
        select_stored_channel(&self.channel, EventKind::Leave, config.channel_id.as_ref());
    }
}

impl FormKind for LeaveConfigForm {
    type Request = LeaveConfig;

    const NAME: &'static str = "leave-config";
    const LABELS: SubmitLabels = CONFIG_LABELS;
    const TRANSPORT_FAILURE: &'static str = "Error saving leave config";

    fn collect(&self) -> std::result::Result<LeaveConfig, ValidationError> {
        let channel_id = self.channel.value();
        if self.enabled && channel_id.is_none() {
            return Err(ValidationError("Please select a channel for leave messages"));
        }
        Ok(LeaveConfig {
            guild_id: self.guild_id.clone(),
            enabled: self.enabled,
            channel_id,
            message_template: self.message_template.clone(),
        })
    }
}

pub struct JoinDmConfigForm {
    guild_id: GuildId,
    pub enabled: bool,
    pub message_template: String,
}

impl JoinDmConfigForm {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            enabled: false,
            message_template: String::new(),
        }
    }

    pub fn apply(&mut self, config: &JoinDmConfig) {
        self.enabled = config.enabled;
        self.message_template = config.message_template.clone();
    }
}

impl FormKind for JoinDmConfigForm {
    type Request = JoinDmConfig;

    const NAME: &'static str = "join-dm-config";
    const LABELS: SubmitLabels = CONFIG_LABELS;
    const TRANSPORT_FAILURE: &'static str = "Error saving join DM config";

    fn collect(&self) -> std::result::Result<JoinDmConfig, ValidationError> {
        Ok(JoinDmConfig {
            guild_id: self.guild_id.clone(),
            enabled: self.enabled,
            message_template: self.message_template.clone(),
        })
    }
}

/// Logs empty or failed config fetches.
fn stored<T>(kind: EventKind, guild_id: &GuildId, reply: Result<Option<T>>) -> Option<T> {
    match reply {
        Ok(Some(config)) => Some(config),
        Ok(None) => {
            debug!(event = kind.path_segment(), %guild_id, "no stored configuration");
            None
        }
        Err(err) => {
            warn!(event = kind.path_segment(), %guild_id, error = %err, "failed to load configuration");
            None
        }
    }
}

impl FormBinder<JoinConfigForm> {
    /// Fills the form from the stored configuration, if any.
    pub async fn load_stored(&self) -> bool {
        let guild_id = self.read(|form| form.guild_id.clone());
        let reply = self.api.join_config(&guild_id).await;
        match stored(EventKind::Join, &guild_id, reply) {
            Some(config) => {
                self.edit(|form| form.apply(&config));
                true
            }
            None => false,
        }
    }

    /// Flips join messages on or off without saving the rest of the form.
    pub async fn toggle_enabled(&self, enabled: bool) -> Result<()> {
        let guild_id = self.read(|form| form.guild_id.clone());
        self.edit(|form| form.enabled = enabled);
        match self.api.toggle_join(&guild_id, enabled).await {
            Ok(()) => {
                let state = if enabled { "enabled" } else { "disabled" };
                info!(%guild_id, enabled, "join messages toggled");
                self.alerts.info(format!("Join messages {state}"));
                Ok(())
            }
            Err(err) => {
                warn!(%guild_id, enabled, error = %err, "failed to toggle join messages");
                Err(err)
            }
        }
    }
}

impl FormBinder<LeaveConfigForm> {
    pub async fn load_stored(&self) -> bool {
        let guild_id = self.read(|form| form.guild_id.clone());
        let reply = self.api.leave_config(&guild_id).await;
        match stored(EventKind::Leave, &guild_id, reply) {
            Some(config) => {
                self.edit(|form| form.apply(&config));
                true
            }
            None => false,
        }
    }
}

impl FormBinder<JoinDmConfigForm> {
    pub async fn load_stored(&self) -> bool {
        let guild_id = self.read(|form| form.guild_id.clone());
        let reply = self.api.join_dm_config(&guild_id).await;
        match stored(EventKind::JoinDm, &guild_id, reply) {
            Some(config) => {
                self.edit(|form| form.apply(&config));
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub user_id: UserId,
    pub points: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InviteBoardView {
    pub stats: InviteStats,
    pub rows: Vec<LeaderboardRow>,
    pub top_inviter: Option<String>,
    /// False until a leaderboard response has been applied.
    pub leaderboard_loaded: bool,
}

impl InviteBoardView {
    pub const EMPTY_LEADERBOARD: &'static str = "No data yet";

    pub fn placeholder(&self) -> Option<&'static str> {
        (self.leaderboard_loaded && self.rows.is_empty()).then_some(Self::EMPTY_LEADERBOARD)
    }
}

/// Invite totals plus the points leaderboard.
pub struct InviteBoard {
    api: Arc<dyn DashboardApi>,
    guild_id: GuildId,
    limit: u32,
    view: Mutex<InviteBoardView>,
}

impl InviteBoard {
    pub fn new(api: Arc<dyn DashboardApi>, guild_id: GuildId, limit: u32) -> Self {
        Self {
            api,
            guild_id,
            limit,
            view: Mutex::new(InviteBoardView::default()),
        }
    }

    pub fn view(&self) -> InviteBoardView {
        lock(&self.view).clone()
    }

    /// Fetches stats and leaderboard together; each half is applied on its
    /// own if it succeeds.
    pub async fn refresh(&self) {
        let (stats, leaderboard) = futures::join!(
            self.api.invite_stats(&self.guild_id),
            self.api.invite_leaderboard(&self.guild_id, self.limit)
        );

        let mut view = lock(&self.view);
        match stats {
            Ok(stats) => view.stats = stats,
            Err(err) => warn!(guild_id = %self.guild_id, error = %err, "failed to load invite stats"),
        }
        match leaderboard {
            Ok(entries) => apply_leaderboard(&mut view, entries),
            Err(err) => {
                warn!(guild_id = %self.guild_id, error = %err, "failed to load invite leaderboard")
            }
        }
    }
}

fn apply_leaderboard(view: &mut InviteBoardView, entries: Vec<LeaderboardEntry>) {
    view.leaderboard_loaded = true;
    if let Some(top) = entries.first() {
        view.top_inviter = Some(format!("{} pts", top.total_points));
    }
    view.rows = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| LeaderboardRow {
            rank: index + 1,
            user_id: entry.user_id,
            points: entry.total_points,
        })
        .collect();
}

#[cfg(test)]
#[path = "tests/events_tests.rs"]
mod tests;
