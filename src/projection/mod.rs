//! Iteration projections over subfeed snapshots.
//!
//! Both stages are pure functions of their inputs with an explicit,
//! identity-keyed cache in front:
//! - `IterationProjector`: snapshot -> iterations (absent until loaded)
//! - `TableProjector`: iterations -> column schema + rows

use std::sync::Arc;

use tracing::debug;

use crate::feed::SubfeedSnapshot;
use crate::model::{Iteration, Message};

pub mod table;
pub mod timestamp;

pub use table::{tabulate, CellValue, Column, IterationTable, Row, TableProjector};
pub use timestamp::format_timestamp;

/// Iterations in stream order, or `None` while the initial load is pending.
pub fn project_iterations(messages: &[Message], loaded_initial: bool) -> Option<Vec<Iteration>> {
    if !loaded_initial {
        return None;
    }
    Some(
        messages
            .iter()
            .filter_map(Message::as_iteration)
            .cloned()
            .collect(),
    )
}

struct ProjectionCache {
    messages: Arc<Vec<Message>>,
    version: u64,
    loaded_initial: bool,
    iterations: Option<Arc<[Iteration]>>,
}

impl ProjectionCache {
    fn matches(&self, snapshot: &SubfeedSnapshot) -> bool {
        Arc::ptr_eq(&self.messages, &snapshot.messages)
            && self.version == snapshot.version
            && self.loaded_initial == snapshot.loaded_initial
    }
}

/// Memoizing filter from subfeed snapshots to iterations.
///
/// Recomputes only when the message vector, its version, or the loaded
/// flag changes; otherwise returns the same `Arc` as the previous call.
#[derive(Default)]
pub struct IterationProjector {
    cache: Option<ProjectionCache>,
}

impl IterationProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project(&mut self, snapshot: &SubfeedSnapshot) -> Option<Arc<[Iteration]>> {
        if let Some(cache) = &self.cache {
            if cache.matches(snapshot) {
                return cache.iterations.clone();
            }
        }

        let iterations: Option<Arc<[Iteration]>> =
            project_iterations(&snapshot.messages, snapshot.loaded_initial).map(Into::into);
        debug!(
            version = snapshot.version,
            loaded_initial = snapshot.loaded_initial,
            messages = snapshot.messages.len(),
            iterations = ?iterations.as_ref().map(|its| its.len()),
            "Projected iterations"
        );

        self.cache = Some(ProjectionCache {
            messages: Arc::clone(&snapshot.messages),
            version: snapshot.version,
            loaded_initial: snapshot.loaded_initial,
            iterations: iterations.clone(),
        });
        iterations
    }

    /// Forget the cached projection.
    pub fn reset(&mut self) {
        self.cache = None;
    }
}
