//! In-memory subfeed hub.
//!
//! Each subfeed is backed by a tokio `watch` channel carrying the latest
//! `SubfeedSnapshot`. Subscribers always see the most recent state; updates
//! between two reads are coalesced.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info};

use super::{Result, SubfeedAddress, SubfeedError, SubfeedSnapshot, SubfeedSource, Subscription};
use crate::model::Message;

type SubfeedKey = (String, String);

fn key_for(address: &SubfeedAddress) -> Result<SubfeedKey> {
    address
        .parts()
        .map(|(feed, subfeed)| (feed.to_string(), subfeed.to_string()))
        .ok_or_else(|| SubfeedError::IncompleteAddress(address.clone()))
}

/// Push-based subfeed hub living in a single process.
#[derive(Default)]
pub struct ChannelSubfeedHub {
    feeds: RwLock<HashMap<SubfeedKey, watch::Sender<SubfeedSnapshot>>>,
}

impl ChannelSubfeedHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a change to a subfeed, creating it if needed, and notify subscribers.
    async fn update<F>(&self, address: &SubfeedAddress, change: F) -> Result<u64>
    where
        F: FnOnce(&mut SubfeedSnapshot),
    {
        let key = key_for(address)?;
        let mut feeds = self.feeds.write().await;
        let sender = feeds
            .entry(key)
            .or_insert_with(|| watch::channel(SubfeedSnapshot::empty()).0);

        let mut version = 0;
        sender.send_modify(|snapshot| {
            change(snapshot);
            snapshot.version += 1;
            version = snapshot.version;
        });
        Ok(version)
    }

    /// Append one message to a subfeed.
    pub async fn append(&self, address: &SubfeedAddress, message: Message) -> Result<()> {
        let version = self
            .update(address, |snapshot| {
                Arc::make_mut(&mut snapshot.messages).push(message)
            })
            .await?;
        debug!(subfeed = %address, version, "Appended message");
        Ok(())
    }

    /// Append a batch of messages as a single update.
    pub async fn append_all(
        &self,
        address: &SubfeedAddress,
        messages: impl IntoIterator<Item = Message>,
    ) -> Result<()> {
        let messages: Vec<Message> = messages.into_iter().collect();
        let count = messages.len();
        let version = self
            .update(address, |snapshot| {
                Arc::make_mut(&mut snapshot.messages).extend(messages)
            })
            .await?;
        debug!(subfeed = %address, count, version, "Appended messages");
        Ok(())
    }

    /// Signal that the initial backlog has been delivered.
    pub async fn mark_loaded(&self, address: &SubfeedAddress) -> Result<()> {
        self.update(address, |snapshot| snapshot.loaded_initial = true)
            .await?;
        info!(subfeed = %address, "Subfeed initial load complete");
        Ok(())
    }

    /// Whether the subfeed exists and has completed its initial load.
    pub async fn is_loaded(&self, address: &SubfeedAddress) -> bool {
        let Ok(key) = key_for(address) else {
            return false;
        };
        self.feeds
            .read()
            .await
            .get(&key)
            .map(|sender| sender.borrow().loaded_initial)
            .unwrap_or(false)
    }

    /// Number of live subscriptions on a subfeed.
    pub async fn subscriber_count(&self, address: &SubfeedAddress) -> usize {
        let Ok(key) = key_for(address) else {
            return 0;
        };
        self.feeds
            .read()
            .await
            .get(&key)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl SubfeedSource for ChannelSubfeedHub {
    async fn subscribe(&self, address: &SubfeedAddress) -> Result<Subscription> {
        let Ok(key) = key_for(address) else {
            debug!(subfeed = %address, "Incomplete address, subscription detached");
            return Ok(Subscription::detached(address.clone()));
        };

        let receiver = {
            let mut feeds = self.feeds.write().await;
            feeds
                .entry(key)
                .or_insert_with(|| watch::channel(SubfeedSnapshot::empty()).0)
                .subscribe()
        };

        info!(subfeed = %address, "Subscribed to subfeed");
        Ok(Subscription::attached(address.clone(), receiver))
    }
}
