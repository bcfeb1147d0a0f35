use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use shared::{domain::GuildId, protocol::Channel};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{api::DashboardApi, error::Result, lock};

pub type ChannelSnapshot = Arc<Vec<Channel>>;

/// Anything that renders the channel list. `rebuild` always receives the full
/// ordered list and must replace whatever it showed before.
pub trait ChannelConsumer: Send + Sync {
    fn rebuild(&self, channels: &[Channel]);
}

/// Single source of truth for the guild's channels.
pub struct ChannelDirectory {
    api: Arc<dyn DashboardApi>,
    consumers: Mutex<Vec<(String, Arc<dyn ChannelConsumer>)>>,
    snapshot: watch::Sender<Option<ChannelSnapshot>>,
    started: AtomicU64,
    /// Generation of the load whose list is current.
    published: Mutex<u64>,
}

impl ChannelDirectory {
    pub fn new(api: Arc<dyn DashboardApi>) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            api,
            consumers: Mutex::new(Vec::new()),
            snapshot,
            started: AtomicU64::new(0),
            published: Mutex::new(0),
        }
    }

    /// Registers `consumer` under `key`, replacing any consumer already
    /// registered under the same key. A loaded snapshot is pushed to it
    /// straight away.
    pub fn register(&self, key: impl Into<String>, consumer: Arc<dyn ChannelConsumer>) {
        let key = key.into();
        {
            let mut consumers = lock(&self.consumers);
            match consumers.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = consumer.clone(),
                None => consumers.push((key.clone(), consumer.clone())),
            }
        }
        debug!(consumer = %key, "channel consumer registered");

        if let Some(snapshot) = self.snapshot() {
            consumer.rebuild(&snapshot);
        }
    }

    pub fn unregister(&self, key: &str) -> bool {
        let mut consumers = lock(&self.consumers);
        let before = consumers.len();
        consumers.retain(|(existing, _)| existing != key);
        consumers.len() != before
    }

    pub fn consumer_count(&self) -> usize {
        lock(&self.consumers).len()
    }

    pub fn snapshot(&self) -> Option<ChannelSnapshot> {
        self.snapshot.borrow().clone()
    }

    /// Resolves once a snapshot has been published.
    pub async fn wait_loaded(&self) -> ChannelSnapshot {
        let mut rx = self.snapshot.subscribe();
        loop {
            let current = rx.borrow_and_update().clone();
            if let Some(snapshot) = current {
                return snapshot;
            }
            // The sender lives in `self`, so the channel cannot close here.
            if rx.changed().await.is_err() {
                return Arc::new(Vec::new());
            }
        }
    }

    /// Fetches the channel list and rebuilds every consumer from it. On
    /// failure the previous snapshot stays current. A list that resolves after
    /// a newer one was already published is dropped and the newer snapshot is
    /// returned instead.
    pub async fn load(&self, guild_id: &GuildId) -> Result<ChannelSnapshot> {
        let generation = self.started.fetch_add(1, Ordering::SeqCst) + 1;

        let channels = match self.api.list_channels(guild_id).await {
            Ok(channels) => channels,
            Err(err) => {
                warn!(%guild_id, error = %err, "failed to load channel directory");
                return Err(err);
            }
        };

        let mut published = lock(&self.published);
        if *published > generation {
            if let Some(current) = self.snapshot() {
                debug!(
                    %guild_id,
                    generation,
                    current = *published,
                    "discarding superseded channel list"
                );
                return Ok(current);
            }
        }
        *published = generation;

        let snapshot: ChannelSnapshot = Arc::new(channels);
        self.snapshot.send_replace(Some(snapshot.clone()));

        let consumers: Vec<Arc<dyn ChannelConsumer>> = lock(&self.consumers)
            .iter()
            .map(|(_, consumer)| consumer.clone())
            .collect();
        for consumer in &consumers {
            consumer.rebuild(&snapshot);
        }
        drop(published);

        info!(
            %guild_id,
            channels = snapshot.len(),
            consumers = consumers.len(),
            "channel directory loaded"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
#[path = "tests/channels_tests.rs"]
mod tests;
