//! Explicit startup of the whole dashboard.

use std::sync::Arc;

use shared::domain::GuildId;
use tracing::{debug, info, warn};

use crate::{
    alerts::AlertNotifier,
    api::DashboardApi,
    channels::ChannelDirectory,
    config::Settings,
    controls::{ChannelSelect, GroupedChannelList, StatusPanel},
    error::{DashboardError, Result},
    events::{InviteBoard, JoinConfigForm, JoinDmConfigForm, LeaveConfigForm},
    forms::{EmbedMessageForm, FormBinder, TextMessageForm},
    status::{BotStatusPoller, ControlToggle},
};

/// Application state for one dashboard page. Every component is reachable
/// from here; nothing is global.
pub struct Dashboard {
    pub guild_id: GuildId,
    pub alerts: AlertNotifier,
    pub channels: Arc<ChannelDirectory>,
    pub status: Arc<BotStatusPoller>,
    pub status_panel: Arc<StatusPanel>,
    pub channel_list: Arc<GroupedChannelList>,
    pub text_message: FormBinder<TextMessageForm>,
    pub embed_message: FormBinder<EmbedMessageForm>,
    pub join: FormBinder<JoinConfigForm>,
    pub leave: FormBinder<LeaveConfigForm>,
    pub join_dm: FormBinder<JoinDmConfigForm>,
    pub invites: InviteBoard,
}

/// Guild from `/api/config`, or the configured fallback.
pub async fn resolve_guild(api: &dyn DashboardApi, settings: &Settings) -> Result<GuildId> {
    match api.fetch_config().await {
        Ok(config) if !config.guild_id.is_empty() => return Ok(config.guild_id),
        Ok(_) => warn!("dashboard config carried no guild id"),
        Err(err) => warn!(error = %err, "failed to load dashboard config"),
    }
    settings
        .fallback_guild_id
        .clone()
        .ok_or(DashboardError::MissingGuild)
}

impl Dashboard {
    /// Resolves the guild, wires every component and performs the initial
    /// loads. The status poller keeps running until `shutdown` or drop.
    pub async fn start(api: Arc<dyn DashboardApi>, settings: &Settings) -> Result<Self> {
        let guild_id = resolve_guild(api.as_ref(), settings).await?;
        info!(%guild_id, "dashboard starting");

        let dashboard = Self::wire(api, guild_id, settings);
        dashboard.status.start(settings.status_poll_interval);

        // Selects must hold options before stored configs pick a channel.
        if let Err(err) = dashboard.channels.load(&dashboard.guild_id).await {
            debug!(error = %err, "continuing without a channel list");
        }

        tokio::join!(
            dashboard.join.load_stored(),
            dashboard.leave.load_stored(),
            dashboard.join_dm.load_stored(),
            dashboard.invites.refresh(),
        );

        info!(guild_id = %dashboard.guild_id, "dashboard ready");
        Ok(dashboard)
    }

    /// Builds and registers every component without performing any I/O.
    pub fn wire(api: Arc<dyn DashboardApi>, guild_id: GuildId, settings: &Settings) -> Self {
        let alerts = AlertNotifier::new();
        let channels = Arc::new(ChannelDirectory::new(api.clone()));
        let status = BotStatusPoller::new(api.clone());

        let status_panel = Arc::new(StatusPanel::default());
        status.register_observer(status_panel.clone());

        let channel_list = Arc::new(GroupedChannelList::default());
        channels.register("channel-list", channel_list.clone());

        // Only the composer selects follow the bot status.
        let composer_keys = ["text-channel-select", "embed-channel-select"];
        let [text_select, embed_select] = composer_keys.map(|key| {
            let select = Arc::new(ChannelSelect::default());
            channels.register(key, select.clone());
            status.register_toggle(select.clone());
            select
        });
        let [join_select, leave_select] = ["join-channel", "leave-channel"].map(|key| {
            let select = Arc::new(ChannelSelect::default());
            select.set_enabled(true);
            channels.register(key, select.clone());
            select
        });

        let text_message = FormBinder::new(
            TextMessageForm::new(text_select),
            api.clone(),
            alerts.clone(),
        );
        let embed_message = FormBinder::new(
            EmbedMessageForm::new(embed_select),
            api.clone(),
            alerts.clone(),
        );
        let join = FormBinder::new(
            JoinConfigForm::new(guild_id.clone(), join_select),
            api.clone(),
            alerts.clone(),
        );
        let leave = FormBinder::new(
            LeaveConfigForm::new(guild_id.clone(), leave_select),
            api.clone(),
            alerts.clone(),
        );
        let join_dm = FormBinder::new(
            JoinDmConfigForm::new(guild_id.clone()),
            api.clone(),
            alerts.clone(),
        );

        status.register_toggle(text_message.button().clone());
        status.register_toggle(embed_message.button().clone());
        status.register_toggle(join.button().clone());
        status.register_toggle(leave.button().clone());
        status.register_toggle(join_dm.button().clone());

        let invites = InviteBoard::new(api, guild_id.clone(), settings.leaderboard_limit);

        Self {
            guild_id,
            alerts,
            channels,
            status,
            status_panel,
            channel_list,
            text_message,
            embed_message,
            join,
            leave,
            join_dm,
            invites,
        }
    }

    pub fn shutdown(&self) {
        self.status.stop();
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.status.stop();
    }
}

#[cfg(test)]
#[path = "tests/dashboard_tests.rs"]
mod tests;
