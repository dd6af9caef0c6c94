//! Collector extension for testing.

use std::sync::{Arc, PoisonError, RwLock};

use super::{PanelBody, RenderedPanel, RunViewExtension};
use crate::model::{Iteration, Run};

/// What a collector was asked to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRecord {
    pub run_id: String,
    /// Iteration count, or `None` if rendered before the initial load.
    pub iterations: Option<usize>,
}

/// Extension that records every render request for later inspection.
pub struct CollectorExtension {
    name: String,
    collected: Arc<RwLock<Vec<RenderRecord>>>,
}

impl CollectorExtension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collected: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Get a handle to the collected records.
    ///
    /// This can be cloned and used to inspect renders from tests.
    pub fn collected(&self) -> Arc<RwLock<Vec<RenderRecord>>> {
        Arc::clone(&self.collected)
    }

    pub fn records(&self) -> Vec<RenderRecord> {
        self.collected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self) -> usize {
        self.collected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Take all records, leaving the collector empty.
    pub fn take(&self) -> Vec<RenderRecord> {
        std::mem::take(
            &mut *self
                .collected
                .write()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }
}

impl RunViewExtension for CollectorExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, run: &Run, iterations: Option<&Arc<[Iteration]>>) -> RenderedPanel {
        self.collected
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RenderRecord {
                run_id: run.run_id.clone(),
                iterations: iterations.map(|its| its.len()),
            });
        RenderedPanel::new(&self.name, PanelBody::Empty)
    }
}
