use super::*;
use shared::domain::ChannelId;
use tokio::sync::Notify;
use crate::{
    controls::{ChannelSelect, GroupedChannelList},
    test_support::{channel, transport_error, ScriptedApi},
};

fn directory(api: &Arc<ScriptedApi>) -> ChannelDirectory {
    ChannelDirectory::new(api.clone())
}

fn guild() -> GuildId {
    GuildId::from(1408125343071736009_u64)
}

fn option_values(select: &ChannelSelect) -> Vec<String> {
    select.options().into_iter().map(|o| o.value).collect()
}

#[tokio::test]
async fn every_select_gets_placeholder_plus_one_option_per_channel_in_order() {
    let api = Arc::new(ScriptedApi::default());
    api.channels.push_ok(vec![
        channel("30", "welcome", Some("Info")),
        channel("10", "general", Some("Chat")),
        channel("20", "memes", Some("Chat")),
    ]);
    let directory = directory(&api);
    let text = Arc::new(ChannelSelect::default());
    let embed = Arc::new(ChannelSelect::new("// Pick a target"));
    directory.register("text-channel-select", text.clone());
    directory.register("embed-channel-select", embed.clone());

    directory.load(&guild()).await.expect("load");

    for select in [&text, &embed] {
        assert_eq!(option_values(select), vec!["", "30", "10", "20"]);
    }
    let labels: Vec<String> = embed.options().into_iter().map(|o| o.label).collect();
    assert_eq!(labels, vec!["// Pick a target", "# welcome", "# general", "# memes"]);
}

#[tokio::test]
async fn reload_replaces_options_instead_of_appending() {
    let api = Arc::new(ScriptedApi::default());
    api.channels
        .push_ok(vec![channel("1", "general", None), channel("2", "memes", None)])
        .push_ok(vec![channel("2", "memes", None), channel("3", "rules", None)]);
    let directory = directory(&api);
    let select = Arc::new(ChannelSelect::default());
    directory.register("text-channel-select", select.clone());

    directory.load(&guild()).await.expect("first load");
    assert!(select.select("1"));
    directory.load(&guild()).await.expect("second load");

    assert_eq!(option_values(&select), vec!["", "2", "3"]);
    assert_eq!(select.value(), None, "selection of a vanished channel is cleared");
}

#[tokio::test]
async fn selection_survives_reload_when_channel_still_exists() {
    let api = Arc::new(ScriptedApi::default());
    api.channels
        .push_ok(vec![channel("1", "general", None)])
        .push_ok(vec![channel("0", "announcements", None), channel("1", "general", None)]);
    let directory = directory(&api);
    let select = Arc::new(ChannelSelect::default());
    directory.register("text-channel-select", select.clone());

    directory.load(&guild()).await.expect("first load");
    assert!(select.select("1"));
    directory.load(&guild()).await.expect("second load");

    assert_eq!(select.value(), Some(ChannelId::from("1")));
}

#[tokio::test]
async fn failed_load_keeps_previous_snapshot_and_consumers() {
    let api = Arc::new(ScriptedApi::default());
    api.channels
        .push_ok(vec![channel("1", "general", None)])
        .push_err(transport_error());
    let directory = directory(&api);
    let select = Arc::new(ChannelSelect::default());
    directory.register("text-channel-select", select.clone());

    directory.load(&guild()).await.expect("first load");
    assert!(directory.load(&guild()).await.is_err());

    assert_eq!(option_values(&select), vec!["", "1"]);
    assert_eq!(directory.snapshot().map(|s| s.len()), Some(1));
    assert_eq!(api.channels.calls(), 2, "failures are not retried");
}

#[tokio::test]
async fn registering_a_key_twice_replaces_the_consumer() {
    let api = Arc::new(ScriptedApi::default());
    api.channels.push_ok(vec![channel("1", "general", None)]);
    let directory = directory(&api);
    let stale = Arc::new(ChannelSelect::default());
    let fresh = Arc::new(ChannelSelect::default());

    directory.register("join-channel", stale.clone());
    directory.register("join-channel", fresh.clone());
    assert_eq!(directory.consumer_count(), 1);

    directory.load(&guild()).await.expect("load");
    assert_eq!(option_values(&fresh), vec!["", "1"]);
    assert_eq!(option_values(&stale), vec![""]);

    assert!(directory.unregister("join-channel"));
    assert!(!directory.unregister("join-channel"));
}

#[tokio::test]
async fn late_consumers_are_built_from_the_current_snapshot() {
    let api = Arc::new(ScriptedApi::default());
    api.channels.push_ok(vec![channel("1", "general", None)]);
    let directory = directory(&api);
    directory.load(&guild()).await.expect("load");

    let late = Arc::new(ChannelSelect::default());
    directory.register("leave-channel", late.clone());
    assert_eq!(option_values(&late), vec!["", "1"]);
}

#[tokio::test]
async fn grouped_list_starts_a_group_on_each_category_change() {
    let api = Arc::new(ScriptedApi::default());
    api.channels.push_ok(vec![
        channel("1", "rules", Some("Info")),
        channel("2", "general", Some("Chat")),
        channel("3", "memes", Some("Chat")),
        channel("4", "lost", None),
        channel("5", "faq", Some("Info")),
    ]);
    let directory = directory(&api);
    let list = Arc::new(GroupedChannelList::default());
    directory.register("channel-list", list.clone());

    directory.load(&guild()).await.expect("load");

    let groups: Vec<(String, usize)> = list
        .groups()
        .into_iter()
        .map(|g| (g.category, g.channels.len()))
        .collect();
    assert_eq!(
        groups,
        vec![
            ("Info".to_string(), 1),
            ("Chat".to_string(), 2),
            ("Uncategorized".to_string(), 1),
            ("Info".to_string(), 1),
        ]
    );
}

#[tokio::test]
async fn wait_loaded_resolves_after_first_snapshot() {
    let api = Arc::new(ScriptedApi::default());
    api.channels.push_ok(vec![channel("1", "general", None)]);
    let directory = Arc::new(directory(&api));

    let waiter = {
        let directory = directory.clone();
        tokio::spawn(async move { directory.wait_loaded().await })
    };
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());

    directory.load(&guild()).await.expect("load");
    let snapshot = waiter.await.expect("join");
    assert_eq!(snapshot.len(), 1);
}

fn gated_backend(gate: &Arc<Notify>) -> ScriptedApi {
    ScriptedApi {
        channels_gate: Some(gate.clone()),
        ..ScriptedApi::default()
    }
}

#[tokio::test]
async fn slow_load_is_published_when_the_newer_load_fails() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(gated_backend(&gate));
    api.channels
        .push_ok(vec![channel("1", "general", None), channel("2", "memes", None)])
        .push_err(transport_error());
    let directory = Arc::new(directory(&api));
    let select = Arc::new(ChannelSelect::default());
    directory.register("text-channel-select", select.clone());

    let slow = {
        let directory = directory.clone();
        tokio::spawn(async move { directory.load(&guild()).await })
    };
    tokio::task::yield_now().await;
    assert_eq!(api.channels.calls(), 1);

    assert!(directory.load(&guild()).await.is_err());
    gate.notify_one();

    let snapshot = slow.await.expect("join").expect("slow load");
    assert_eq!(snapshot.len(), 2);
    assert_eq!(directory.snapshot().map(|s| s.len()), Some(2));
    assert_eq!(option_values(&select), vec!["", "1", "2"]);
}

#[tokio::test]
async fn slow_load_never_overwrites_a_newer_published_list() {
    let gate = Arc::new(Notify::new());
    let api = Arc::new(gated_backend(&gate));
    api.channels
        .push_ok(vec![channel("1", "general", None)])
        .push_ok(vec![channel("7", "rules", None), channel("8", "faq", None)]);
    let directory = Arc::new(directory(&api));
    let select = Arc::new(ChannelSelect::default());
    directory.register("text-channel-select", select.clone());

    let slow = {
        let directory = directory.clone();
        tokio::spawn(async move { directory.load(&guild()).await })
    };
    tokio::task::yield_now().await;

    directory.load(&guild()).await.expect("newer load");
    gate.notify_one();

    let snapshot = slow.await.expect("join").expect("slow load");
    let ids: Vec<&str> = snapshot.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["7", "8"], "superseded load reports the current list");
    assert_eq!(option_values(&select), vec!["", "7", "8"]);
}
