//! Logging extension for debugging iteration flow.

use std::sync::Arc;

use tracing::info;

use super::{PanelBody, RenderedPanel, RunViewExtension, ITERATION_LOG};
use crate::model::{Iteration, Run};
use crate::projection::format_timestamp;

/// Extension that logs every iteration it is asked to render.
pub struct IterationLogExtension {
    name: String,
}

impl IterationLogExtension {
    pub fn new() -> Self {
        Self::named(ITERATION_LOG)
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for IterationLogExtension {
    fn default() -> Self {
        Self::new()
    }
}

impl RunViewExtension for IterationLogExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, run: &Run, iterations: Option<&Arc<[Iteration]>>) -> RenderedPanel {
        let Some(iterations) = iterations else {
            return RenderedPanel::new(&self.name, PanelBody::Empty);
        };

        for (i, it) in iterations.iter().enumerate() {
            info!(
                extension = %self.name,
                run_id = %run.run_id,
                index = i,
                chain_id = %it.chain_id,
                timestamp = %format_timestamp(it.timestamp),
                parameters = it.parameters.len(),
                "Iteration"
            );
        }

        let chains = {
            let mut ids: Vec<String> = iterations.iter().map(|it| it.chain_id.to_string()).collect();
            ids.sort();
            ids.dedup();
            ids.len()
        };
        RenderedPanel::new(
            &self.name,
            PanelBody::Text(format!(
                "{} iterations across {} chains",
                iterations.len(),
                chains
            )),
        )
    }
}
