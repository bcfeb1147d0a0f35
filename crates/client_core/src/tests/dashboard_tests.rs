use super::*;
use shared::protocol::{BotStatus, DashboardConfig, JoinConfig};

use crate::{
    forms::SubmitOutcome,
    test_support::{channel, transport_error, ScriptedApi},
};

fn scripted_backend() -> ScriptedApi {
    backend_with_status(BotStatus::online("Onza#0001", 1, 12.0))
}

fn backend_with_status(status: BotStatus) -> ScriptedApi {
    let api = ScriptedApi::default();
    api.config.push_ok(DashboardConfig {
        guild_id: GuildId::from(1408125343071736009_u64),
    });
    api.status.push_ok(status);
    api.channels.push_ok(vec![
        channel("10", "welcome", Some("Info")),
        channel("20", "general", Some("Chat")),
    ]);
    api.join_config.push_ok(Some(JoinConfig {
        guild_id: GuildId::from(1408125343071736009_u64),
        enabled: true,
        channel_id: Some("10".into()),
        message_template: "Welcome!".into(),
        embed_enabled: false,
    }));
    api.leave_config.push_ok(None);
    api.join_dm_config.push_ok(None);
    api
}

async fn wait_for_first_poll(dashboard: &Dashboard) {
    let mut rx = dashboard.status.subscribe();
    rx.wait_for(Option::is_some).await.expect("poller alive");
}

#[tokio::test]
async fn start_wires_every_component_from_one_config_fetch() {
    let api = Arc::new(scripted_backend());
    let dashboard = Dashboard::start(api.clone(), &Settings::default())
        .await
        .expect("start");
    wait_for_first_poll(&dashboard).await;

    assert_eq!(dashboard.guild_id.as_str(), "1408125343071736009");
    assert_eq!(api.config.calls(), 1);
    assert_eq!(api.channels.calls(), 1);

    let selects = [
        dashboard.text_message.read(|f| f.channel().clone()),
        dashboard.embed_message.read(|f| f.channel().clone()),
        dashboard.join.read(|f| f.channel().clone()),
        dashboard.leave.read(|f| f.channel().clone()),
    ];
    for select in &selects {
        assert_eq!(select.options().len(), 3);
        assert!(!select.is_disabled());
    }
    assert_eq!(dashboard.channel_list.groups().len(), 2);
    assert_eq!(
        dashboard.join.read(|f| f.channel().value()),
        Some("10".into())
    );
    assert_eq!(dashboard.status_panel.view().text, "ONLINE");
    let invites = dashboard.invites.view();
    assert!(invites.rows.is_empty());
    assert_eq!(invites.placeholder(), None, "unscripted leaderboard never loaded");
}

#[tokio::test]
async fn offline_bot_disables_every_submit_control() {
    let api = Arc::new(backend_with_status(BotStatus::offline("Bot not connected")));

    let dashboard = Dashboard::start(api.clone(), &Settings::default())
        .await
        .expect("start");
    wait_for_first_poll(&dashboard).await;

    assert!(dashboard.text_message.button().is_disabled());
    assert!(dashboard.embed_message.button().is_disabled());
    assert!(dashboard.join.button().is_disabled());
    assert!(dashboard.leave.button().is_disabled());
    assert!(dashboard.join_dm.button().is_disabled());

    assert!(dashboard.text_message.read(|f| f.channel().is_disabled()));
    assert!(dashboard.embed_message.read(|f| f.channel().is_disabled()));
    assert!(!dashboard.join.read(|f| f.channel().is_disabled()));
    assert!(!dashboard.leave.read(|f| f.channel().is_disabled()));

    dashboard.text_message.edit(|form| {
        form.channel().select("20");
        form.content = "anyone there?".into();
    });
    assert_eq!(dashboard.text_message.submit().await, SubmitOutcome::Ignored);
    assert_eq!(api.network_calls(), 0);
}

#[tokio::test]
async fn config_failure_falls_back_to_configured_guild() {
    let api = ScriptedApi::default();
    api.config.push_err(transport_error());
    let settings = Settings {
        fallback_guild_id: Some(GuildId::from(42_u64)),
        ..Settings::default()
    };

    let guild = resolve_guild(&api, &settings).await.expect("fallback");
    assert_eq!(guild, GuildId::from(42_u64));
}

#[tokio::test]
async fn config_failure_without_fallback_aborts_startup() {
    let api = Arc::new(ScriptedApi::default());
    api.config.push_err(transport_error());

    let err = Dashboard::start(api.clone(), &Settings::default())
        .await
        .err()
        .expect("must fail");
    assert!(matches!(err, DashboardError::MissingGuild));
    assert_eq!(api.channels.calls(), 0);
}

#[tokio::test]
async fn dropping_the_dashboard_stops_polling() {
    let api = Arc::new(scripted_backend());
    let dashboard = Dashboard::start(api.clone(), &Settings::default())
        .await
        .expect("start");
    wait_for_first_poll(&dashboard).await;
    let status = dashboard.status.clone();
    assert!(status.is_running());

    drop(dashboard);
    assert!(!status.is_running());
}

#[tokio::test]
async fn failed_channel_load_does_not_abort_startup() {
    let api = ScriptedApi::default();
    api.config.push_ok(DashboardConfig {
        guild_id: GuildId::from(77_u64),
    });
    api.status.push_ok(BotStatus::online("Onza#0001", 1, 12.0));
    api.channels.push_err(transport_error());
    let api = Arc::new(api);

    let dashboard = Dashboard::start(api.clone(), &Settings::default())
        .await
        .expect("start");

    assert!(dashboard.channels.snapshot().is_none());
    assert_eq!(dashboard.text_message.read(|f| f.channel().options().len()), 1);
    assert_eq!(api.join_config.calls(), 1, "stored configs still load");
    assert_eq!(api.invite_stats.calls(), 1);
}
