//! Run page lifecycle step definitions.

use std::fmt;
use std::sync::{Arc, Mutex};

use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use runview::extensions::{ExtensionRegistry, IterationsTableExtension};
use runview::feed::ChannelSubfeedHub;
use runview::view::{Page, RouteAction, WorkspaceRouteDispatch};
use runview::widgets::PlainTextTable;
use runview::{resolve, Iteration, IterationTable, Message, Run, RunPage, RunPageView, WorkspaceState};
use serde_json::{json, Map};

#[derive(Debug, Default)]
struct RecordingRoute {
    actions: Mutex<Vec<RouteAction>>,
}

impl WorkspaceRouteDispatch for RecordingRoute {
    fn dispatch(&self, action: RouteAction) {
        self.actions.lock().unwrap().push(action);
    }
}

/// Test context for run page scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct RunPageWorld {
    hub: Arc<ChannelSubfeedHub>,
    registry: Arc<ExtensionRegistry>,
    route: Arc<RecordingRoute>,
    workspace: WorkspaceState,
    page: Option<RunPage>,
}

impl fmt::Debug for RunPageWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunPageWorld")
            .field("workspace", &self.workspace)
            .field("page", &self.page)
            .finish()
    }
}

impl RunPageWorld {
    fn new() -> Self {
        let registry = ExtensionRegistry::new()
            .with(Arc::new(IterationsTableExtension::new(Arc::new(PlainTextTable))));
        Self {
            hub: Arc::new(ChannelSubfeedHub::new()),
            registry: Arc::new(registry),
            route: Arc::new(RecordingRoute::default()),
            workspace: WorkspaceState::default(),
            page: None,
        }
    }

    fn page(&mut self) -> &mut RunPage {
        self.page.as_mut().expect("Run page not opened")
    }

    fn table(&mut self) -> IterationTable {
        match self.page().render() {
            RunPageView::Ready { panels, .. } => panels
                .iter()
                .find_map(|p| p.table().cloned())
                .expect("No table panel rendered"),
            other => panic!("Expected ready page, got {:?}", other),
        }
    }

    async fn append(&self, uri: &str, timestamp: f64, chain: i64, alpha: i64) {
        let mut parameters = Map::new();
        parameters.insert("alpha".to_string(), json!(alpha));
        let message = Message::from(Iteration::new(timestamp, chain, parameters));
        self.hub.append(&resolve(Some(uri)), message).await.unwrap();
    }
}

// ==========================================================================
// Given
// ==========================================================================

#[given("a workspace with runs:")]
async fn given_workspace(world: &mut RunPageWorld, step: &Step) {
    let table = step.table.as_ref().expect("Step needs a table");
    let runs = table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            let uri = row[1].trim();
            Run::new(row[0].trim(), (!uri.is_empty()).then_some(uri))
        })
        .collect();
    world.workspace = WorkspaceState::new(runs);
}

#[given(expr = "subfeed {string} has an iteration at {int} on chain {int} with alpha {int}")]
async fn given_iteration(world: &mut RunPageWorld, uri: String, timestamp: i64, chain: i64, alpha: i64) {
    world.append(&uri, timestamp as f64, chain, alpha).await;
}

#[given(expr = "subfeed {string} has finished its initial load")]
async fn given_loaded(world: &mut RunPageWorld, uri: String) {
    world.hub.mark_loaded(&resolve(Some(&uri))).await.unwrap();
}

// ==========================================================================
// When
// ==========================================================================

#[when(expr = "the run page for {string} is opened")]
async fn when_opened(world: &mut RunPageWorld, run_id: String) {
    let page = RunPage::open(
        &world.workspace,
        &run_id,
        world.hub.clone(),
        world.registry.clone(),
        world.route.clone(),
    )
    .await
    .unwrap();
    world.page = Some(page);
}

#[when(expr = "subfeed {string} receives an iteration at {int} on chain {int} with alpha {int}")]
async fn when_receives(world: &mut RunPageWorld, uri: String, timestamp: i64, chain: i64, alpha: i64) {
    world.append(&uri, timestamp as f64, chain, alpha).await;
    world.page().changed().await.unwrap();
}

#[when(expr = "the page navigates to {string}")]
async fn when_navigates(world: &mut RunPageWorld, run_id: String) {
    let workspace = world.workspace.clone();
    world.page().navigate(&workspace, &run_id).await.unwrap();
}

#[when("the user goes back")]
async fn when_back(world: &mut RunPageWorld) {
    world.page().back();
}

// ==========================================================================
// Then
// ==========================================================================

#[then(expr = "the page shows {string}")]
async fn then_shows(world: &mut RunPageWorld, expected: String) {
    assert_eq!(world.page().render().to_string(), expected);
}

#[then("the page is loading")]
async fn then_loading(world: &mut RunPageWorld) {
    assert!(matches!(world.page().render(), RunPageView::Loading { .. }));
}

#[then("the page is ready")]
async fn then_ready(world: &mut RunPageWorld) {
    assert!(matches!(world.page().render(), RunPageView::Ready { .. }));
}

#[then(expr = "the table has {int} row(s)")]
async fn then_rows(world: &mut RunPageWorld, count: usize) {
    assert_eq!(world.table().rows.len(), count);
}

#[then(expr = "the table has columns {string}")]
async fn then_columns(world: &mut RunPageWorld, expected: String) {
    let keys: Vec<String> = world.table().columns.into_iter().map(|c| c.key).collect();
    assert_eq!(keys.join(", "), expected);
}

#[then("the page has no live subscription")]
async fn then_no_subscription(world: &mut RunPageWorld) {
    let attached = world
        .page()
        .subscription()
        .map(|s| s.is_attached())
        .unwrap_or(false);
    assert!(!attached);
}

#[then(expr = "subfeed {string} has {int} subscriber(s)")]
async fn then_subscribers(world: &mut RunPageWorld, uri: String, count: usize) {
    assert_eq!(world.hub.subscriber_count(&resolve(Some(&uri))).await, count);
}

#[then("the workspace navigates to the main page")]
async fn then_main_page(world: &mut RunPageWorld) {
    let actions = world.route.actions.lock().unwrap();
    assert_eq!(actions.last(), Some(&RouteAction::GotoPage(Page::Main)));
}
