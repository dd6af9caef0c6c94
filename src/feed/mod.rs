//! Subfeed addressing and subscription.
//!
//! This module contains:
//! - `resolve`: splits a run URI into a feed address and subfeed name
//! - `SubfeedSource` trait: the subscription capability
//! - `Subscription` / `SubfeedSnapshot`: the latest delivered state of a subfeed
//! - Implementations: in-memory channel hub, JSONL file fixtures

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::model::Message;

pub mod channel;
pub mod file;

pub use channel::ChannelSubfeedHub;
pub use file::FileSubfeedSource;

/// Number of leading URI segments that form the feed address.
const FEED_ADDRESS_SEGMENTS: usize = 3;

// ============================================================================
// Address resolution
// ============================================================================

/// Location of a subfeed, as derived from a run URI.
///
/// Either part may be absent; an incomplete address means there is nothing
/// to subscribe to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SubfeedAddress {
    pub feed_address: Option<String>,
    pub subfeed_name: Option<String>,
}

impl SubfeedAddress {
    pub fn new(feed_address: impl Into<String>, subfeed_name: impl Into<String>) -> Self {
        Self {
            feed_address: Some(feed_address.into()),
            subfeed_name: Some(subfeed_name.into()),
        }
    }

    /// Both parts present and non-empty.
    pub fn is_complete(&self) -> bool {
        self.parts().is_some()
    }

    /// `(feed_address, subfeed_name)` when the address is complete.
    pub fn parts(&self) -> Option<(&str, &str)> {
        match (self.feed_address.as_deref(), self.subfeed_name.as_deref()) {
            (Some(feed), Some(subfeed)) if !feed.is_empty() && !subfeed.is_empty() => {
                Some((feed, subfeed))
            }
            _ => None,
        }
    }
}

impl fmt::Display for SubfeedAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{}",
            self.feed_address.as_deref().unwrap_or("-"),
            self.subfeed_name.as_deref().unwrap_or("-")
        )
    }
}

/// Split a run URI into feed address and subfeed name.
///
/// The first three `/`-separated segments form the feed address, the fourth
/// is the subfeed name. Segment content is not validated. An absent or empty
/// URI resolves to an empty address; fewer than four segments leaves the
/// subfeed name absent.
pub fn resolve(uri: Option<&str>) -> SubfeedAddress {
    let uri = match uri {
        Some(uri) if !uri.is_empty() => uri,
        _ => return SubfeedAddress::default(),
    };

    let segments: Vec<&str> = uri.split('/').collect();
    let feed_address = segments
        .iter()
        .take(FEED_ADDRESS_SEGMENTS)
        .copied()
        .collect::<Vec<_>>()
        .join("/");

    SubfeedAddress {
        feed_address: Some(feed_address),
        subfeed_name: segments.get(FEED_ADDRESS_SEGMENTS).map(|s| s.to_string()),
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Result type for subfeed operations.
pub type Result<T> = std::result::Result<T, SubfeedError>;

/// Errors that can occur while subscribing to or feeding a subfeed.
#[derive(Debug, thiserror::Error)]
pub enum SubfeedError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed message on line {line}: {message}")]
    Decode { line: usize, message: String },

    #[error("Incomplete subfeed address: {0}")]
    IncompleteAddress(SubfeedAddress),

    #[error("Invalid subfeed address: {0}")]
    InvalidAddress(String),

    #[error("Subfeed closed")]
    Closed,

    #[error("Subscription is detached and will never change")]
    Detached,
}

/// Latest state delivered for a subfeed.
#[derive(Debug, Clone)]
pub struct SubfeedSnapshot {
    /// Messages in stream order. Replaced copy-on-write on every change.
    pub messages: Arc<Vec<Message>>,
    /// Whether the initial backlog has been delivered.
    pub loaded_initial: bool,
    /// Bumped on every change to the subfeed.
    pub version: u64,
}

impl SubfeedSnapshot {
    /// No messages, initial load not complete.
    pub fn empty() -> Self {
        Self {
            messages: Arc::new(Vec::new()),
            loaded_initial: false,
            version: 0,
        }
    }

    /// A fully loaded snapshot over the given messages.
    pub fn loaded(messages: Vec<Message>) -> Self {
        Self {
            messages: Arc::new(messages),
            loaded_initial: true,
            version: 1,
        }
    }
}

impl Default for SubfeedSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// A live view of one subfeed.
///
/// Dropping the subscription releases it.
pub struct Subscription {
    address: SubfeedAddress,
    receiver: Option<watch::Receiver<SubfeedSnapshot>>,
}

impl Subscription {
    /// A subscription that is permanently empty and never loaded.
    pub fn detached(address: SubfeedAddress) -> Self {
        Self {
            address,
            receiver: None,
        }
    }

    pub(crate) fn attached(
        address: SubfeedAddress,
        receiver: watch::Receiver<SubfeedSnapshot>,
    ) -> Self {
        Self {
            address,
            receiver: Some(receiver),
        }
    }

    pub fn address(&self) -> &SubfeedAddress {
        &self.address
    }

    pub fn is_attached(&self) -> bool {
        self.receiver.is_some()
    }

    /// The most recently delivered state.
    pub fn snapshot(&self) -> SubfeedSnapshot {
        match &self.receiver {
            Some(receiver) => receiver.borrow().clone(),
            None => SubfeedSnapshot::empty(),
        }
    }

    /// Wait for the next update.
    pub async fn changed(&mut self) -> Result<()> {
        match &mut self.receiver {
            Some(receiver) => receiver.changed().await.map_err(|_| SubfeedError::Closed),
            None => Err(SubfeedError::Detached),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("address", &self.address)
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Subscription capability.
///
/// Implementations:
/// - `ChannelSubfeedHub`: in-process, push-based
/// - `FileSubfeedSource`: JSONL fixtures on disk
#[async_trait]
pub trait SubfeedSource: Send + Sync {
    /// Subscribe to a subfeed.
    ///
    /// An incomplete address yields a detached subscription rather than an
    /// error.
    async fn subscribe(&self, address: &SubfeedAddress) -> Result<Subscription>;
}
