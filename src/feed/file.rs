//! JSONL-backed subfeed fixtures.
//!
//! A subfeed `feed://abc/iterations` is read from
//! `<root>/feed/abc/iterations.jsonl`: empty segments of the feed address are
//! dropped and a trailing `:` on a segment is stripped. Each non-blank line
//! holds one JSON message. The file is read once, on first subscription,
//! after which the subfeed is marked loaded. A missing file is a loaded,
//! empty subfeed.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{
    ChannelSubfeedHub, Result, SubfeedAddress, SubfeedError, SubfeedSource, Subscription,
};
use crate::model::Message;

/// File extension for subfeed fixtures.
pub const SUBFEED_FILE_EXTENSION: &str = "jsonl";

/// Read-only subfeed source over a directory of JSONL files.
pub struct FileSubfeedSource {
    root: PathBuf,
    hub: ChannelSubfeedHub,
    /// Held from the loaded check until the subfeed is marked loaded.
    loading: Mutex<()>,
}

impl FileSubfeedSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            hub: ChannelSubfeedHub::new(),
            loading: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the fixture backing a subfeed.
    pub fn path_for(&self, address: &SubfeedAddress) -> Result<PathBuf> {
        let (feed, subfeed) = address
            .parts()
            .ok_or_else(|| SubfeedError::IncompleteAddress(address.clone()))?;

        let mut path = self.root.clone();
        for segment in feed.split('/').filter(|s| !s.is_empty()) {
            let segment = segment.trim_end_matches(':');
            check_segment(segment, feed)?;
            path.push(segment);
        }
        check_segment(subfeed, subfeed)?;
        path.push(format!("{}.{}", subfeed, SUBFEED_FILE_EXTENSION));
        Ok(path)
    }

    async fn load(&self, path: &Path) -> Result<Vec<Message>> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Subfeed file missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        parse_lines(&contents)
    }
}

fn check_segment(segment: &str, context: &str) -> Result<()> {
    if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
        return Err(SubfeedError::InvalidAddress(context.to_string()));
    }
    Ok(())
}

/// Decode one message per non-blank line.
pub fn parse_lines(contents: &str) -> Result<Vec<Message>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<Message>(line).map_err(|e| SubfeedError::Decode {
                line: i + 1,
                message: e.to_string(),
            })
        })
        .collect()
}

#[async_trait]
impl SubfeedSource for FileSubfeedSource {
    async fn subscribe(&self, address: &SubfeedAddress) -> Result<Subscription> {
        if !address.is_complete() {
            return Ok(Subscription::detached(address.clone()));
        }

        let subscription = self.hub.subscribe(address).await?;
        let _loading = self.loading.lock().await;
        if !self.hub.is_loaded(address).await {
            let path = self.path_for(address)?;
            let messages = self.load(&path).await?;
            info!(
                subfeed = %address,
                path = %path.display(),
                count = messages.len(),
                "Loaded subfeed from file"
            );
            self.hub.append_all(address, messages).await?;
            self.hub.mark_loaded(address).await?;
        }
        Ok(subscription)
    }
}
