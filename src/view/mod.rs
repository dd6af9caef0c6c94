//! Run page orchestration.
//!
//! Looks up the run, keeps exactly one subfeed subscription for it, and
//! once the initial load is complete hands `(run, iterations)` to every
//! registered extension.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::extensions::{ExtensionRegistry, RenderedPanel};
use crate::feed::{resolve, SubfeedError, SubfeedSnapshot, SubfeedSource, Subscription};
use crate::model::{Iteration, Run, WorkspaceState};
use crate::projection::IterationProjector;

/// Result type for run page operations.
pub type Result<T> = std::result::Result<T, RunPageError>;

/// Errors from driving a run page.
#[derive(Debug, thiserror::Error)]
pub enum RunPageError {
    #[error("Subscription failed: {0}")]
    Subscription(#[from] SubfeedError),

    #[error("Run not found: {0}")]
    RunNotFound(String),
}

// ============================================================================
// Navigation
// ============================================================================

/// Workspace pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Main,
    Run { run_id: String },
}

/// Route actions understood by the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAction {
    GotoPage(Page),
}

/// Navigation capability.
pub trait WorkspaceRouteDispatch: Send + Sync {
    fn dispatch(&self, action: RouteAction);
}

/// Route dispatch that only logs the requested action.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingRouteDispatch;

impl WorkspaceRouteDispatch for LoggingRouteDispatch {
    fn dispatch(&self, action: RouteAction) {
        info!(action = ?action, "Route action");
    }
}

// ============================================================================
// Run page
// ============================================================================

/// What the run page shows for the current render cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RunPageView {
    /// No run with the requested id. Terminal for this render cycle.
    NotFound { run_id: String },
    /// Waiting for the subfeed's initial load.
    Loading { run: Run },
    Ready {
        run: Run,
        panels: Vec<RenderedPanel>,
    },
}

impl fmt::Display for RunPageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPageView::NotFound { run_id } => write!(f, "Run not found: {}", run_id),
            RunPageView::Loading { .. } => f.write_str("Loading..."),
            RunPageView::Ready { run, panels } => {
                write!(f, "Run {}", run.run_id)?;
                if let Some(label) = &run.label {
                    write!(f, " ({})", label)?;
                }
                for panel in panels {
                    write!(f, "\n\n{}", panel)?;
                }
                Ok(())
            }
        }
    }
}

/// View over a single run.
pub struct RunPage {
    source: Arc<dyn SubfeedSource>,
    registry: Arc<ExtensionRegistry>,
    route: Arc<dyn WorkspaceRouteDispatch>,
    run_id: String,
    run: Option<Run>,
    subscription: Option<Subscription>,
    projector: IterationProjector,
}

impl RunPage {
    /// Open the page for `run_id`, subscribing to the run's subfeed if the
    /// run exists and its URI resolves to a complete address.
    pub async fn open(
        workspace: &WorkspaceState,
        run_id: &str,
        source: Arc<dyn SubfeedSource>,
        registry: Arc<ExtensionRegistry>,
        route: Arc<dyn WorkspaceRouteDispatch>,
    ) -> Result<Self> {
        let mut page = Self {
            source,
            registry,
            route,
            run_id: run_id.to_string(),
            run: None,
            subscription: None,
            projector: IterationProjector::new(),
        };
        page.resubscribe(workspace.find_run(run_id).cloned()).await?;
        Ok(page)
    }

    /// Point the page at `run_id` using the latest run list.
    ///
    /// The subscription is replaced only if the run id or its resolved
    /// address changed.
    pub async fn navigate(&mut self, workspace: &WorkspaceState, run_id: &str) -> Result<()> {
        let run = workspace.find_run(run_id).cloned();
        let address = run.as_ref().map(|r| resolve(r.uri.as_deref()));
        let current = self.subscription.as_ref().map(|s| s.address().clone());

        if self.run_id == run_id && address == current {
            self.run = run;
            return Ok(());
        }

        self.run_id = run_id.to_string();
        self.resubscribe(run).await
    }

    async fn resubscribe(&mut self, run: Option<Run>) -> Result<()> {
        if let Some(previous) = self.subscription.take() {
            info!(subfeed = %previous.address(), "Released subfeed subscription");
        }
        self.projector.reset();

        self.subscription = match &run {
            None => {
                debug!(run_id = %self.run_id, "Run not found, nothing to subscribe to");
                None
            }
            Some(run) => {
                let address = resolve(run.uri.as_deref());
                if address.is_complete() {
                    Some(self.source.subscribe(&address).await?)
                } else {
                    debug!(run_id = %run.run_id, subfeed = %address, "No subfeed for run");
                    Some(Subscription::detached(address))
                }
            }
        };
        self.run = run;
        Ok(())
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    pub fn subscription(&self) -> Option<&Subscription> {
        self.subscription.as_ref()
    }

    fn snapshot(&self) -> SubfeedSnapshot {
        self.subscription
            .as_ref()
            .map(Subscription::snapshot)
            .unwrap_or_default()
    }

    /// Whether the subfeed's initial load has completed.
    pub fn is_loaded(&self) -> bool {
        self.snapshot().loaded_initial
    }

    /// Current iterations, `None` until loaded.
    pub fn iterations(&mut self) -> Option<Arc<[Iteration]>> {
        let snapshot = self.snapshot();
        self.projector.project(&snapshot)
    }

    /// Render the page for the latest delivered subfeed state.
    pub fn render(&mut self) -> RunPageView {
        let Some(run) = self.run.clone() else {
            return RunPageView::NotFound {
                run_id: self.run_id.clone(),
            };
        };

        let snapshot = self.snapshot();
        if !snapshot.loaded_initial {
            return RunPageView::Loading { run };
        }

        let iterations = self.projector.project(&snapshot);
        let panels = self.registry.render_all(&run, iterations.as_ref());
        RunPageView::Ready { run, panels }
    }

    /// Wait until the subscription delivers an update.
    pub async fn changed(&mut self) -> Result<()> {
        match &mut self.subscription {
            Some(subscription) => Ok(subscription.changed().await?),
            None => Err(RunPageError::RunNotFound(self.run_id.clone())),
        }
    }

    /// Return to the workspace main page.
    pub fn back(&self) {
        self.route.dispatch(RouteAction::GotoPage(Page::Main));
    }
}

impl fmt::Debug for RunPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunPage")
            .field("run_id", &self.run_id)
            .field("run", &self.run)
            .field("subscription", &self.subscription)
            .field("registry", &self.registry)
            .finish()
    }
}
