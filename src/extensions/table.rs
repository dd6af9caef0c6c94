//! Reference extension: iterations as a dynamic table.

use std::sync::{Arc, Mutex, PoisonError};

use super::{PanelBody, RenderedPanel, RunViewExtension, ITERATIONS_TABLE};
use crate::model::{Iteration, Run};
use crate::projection::TableProjector;
use crate::widgets::TableWidget;

/// Tabulates iterations and hands the result to a table widget.
///
/// The table is rebuilt only when the iteration slice changes identity.
pub struct IterationsTableExtension {
    widget: Arc<dyn TableWidget>,
    projector: Mutex<TableProjector>,
}

impl IterationsTableExtension {
    pub fn new(widget: Arc<dyn TableWidget>) -> Self {
        Self {
            widget,
            projector: Mutex::new(TableProjector::new()),
        }
    }
}

impl RunViewExtension for IterationsTableExtension {
    fn name(&self) -> &str {
        ITERATIONS_TABLE
    }

    fn render(&self, _run: &Run, iterations: Option<&Arc<[Iteration]>>) -> RenderedPanel {
        let Some(iterations) = iterations else {
            return RenderedPanel::new(ITERATIONS_TABLE, PanelBody::Empty);
        };

        let table = self
            .projector
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .tabulate(iterations);
        let rendered = self.widget.render(&table.rows, &table.columns);
        RenderedPanel::new(ITERATIONS_TABLE, PanelBody::Table { table, rendered })
    }
}
