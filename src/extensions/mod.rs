//! Run-view extensions.
//!
//! Extensions receive the same `(run, iterations)` inputs and each renders
//! its own panel. They cannot influence one another. The registry is a
//! static, ordered list resolved at startup.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ExtensionsConfig;
use crate::model::{Iteration, Run};
use crate::projection::IterationTable;
use crate::widgets::TableWidget;

mod collector;
mod logging;
mod table;

pub use collector::{CollectorExtension, RenderRecord};
pub use logging::IterationLogExtension;
pub use table::IterationsTableExtension;

/// Registry name of [`IterationsTableExtension`].
pub const ITERATIONS_TABLE: &str = "iterations-table";
/// Registry name of [`IterationLogExtension`].
pub const ITERATION_LOG: &str = "iteration-log";

/// A pluggable visualization of one run.
///
/// `render` takes `&self`; extensions that keep derived state across
/// renders use interior mutability.
pub trait RunViewExtension: Send + Sync {
    /// Name of this extension.
    fn name(&self) -> &str;

    /// Render a panel. `iterations` is `None` until the subfeed's initial
    /// load has completed.
    fn render(&self, run: &Run, iterations: Option<&Arc<[Iteration]>>) -> RenderedPanel;
}

/// Output of one extension.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPanel {
    pub extension: String,
    pub body: PanelBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PanelBody {
    /// A table and its rendered form.
    Table {
        table: Arc<IterationTable>,
        rendered: String,
    },
    Text(String),
    Empty,
}

impl RenderedPanel {
    pub fn new(extension: impl Into<String>, body: PanelBody) -> Self {
        Self {
            extension: extension.into(),
            body,
        }
    }

    pub fn table(&self) -> Option<&IterationTable> {
        match &self.body {
            PanelBody::Table { table, .. } => Some(table),
            _ => None,
        }
    }
}

impl fmt::Display for RenderedPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            PanelBody::Table { rendered, .. } => f.write_str(rendered),
            PanelBody::Text(text) => f.write_str(text),
            PanelBody::Empty => Ok(()),
        }
    }
}

/// Ordered list of registered extensions.
#[derive(Default, Clone)]
pub struct ExtensionRegistry {
    extensions: Vec<Arc<dyn RunViewExtension>>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from configured extension names.
    ///
    /// Unknown names are skipped with a warning.
    pub fn from_config(config: &ExtensionsConfig, widget: Arc<dyn TableWidget>) -> Self {
        let mut registry = Self::new();
        for name in &config.enabled {
            match name.as_str() {
                ITERATIONS_TABLE => {
                    registry.register(Arc::new(IterationsTableExtension::new(Arc::clone(&widget))))
                }
                ITERATION_LOG => registry.register(Arc::new(IterationLogExtension::new())),
                other => warn!(extension = %other, "Unknown run-view extension, skipping"),
            }
        }
        info!(extensions = ?registry.names(), "Run-view extensions registered");
        registry
    }

    pub fn register(&mut self, extension: Arc<dyn RunViewExtension>) {
        self.extensions.push(extension);
    }

    pub fn with(mut self, extension: Arc<dyn RunViewExtension>) -> Self {
        self.register(extension);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Render every extension, in registration order.
    pub fn render_all(&self, run: &Run, iterations: Option<&Arc<[Iteration]>>) -> Vec<RenderedPanel> {
        self.extensions
            .iter()
            .map(|e| e.render(run, iterations))
            .collect()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("extensions", &self.names())
            .finish()
    }
}
