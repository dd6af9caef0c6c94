//! Iteration projection and tabulation step definitions.

use std::sync::Arc;

use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use runview::feed::file::parse_lines;
use runview::projection::CellValue;
use runview::{Iteration, IterationProjector, IterationTable, Message, SubfeedSnapshot, TableProjector};
use serde_json::json;

/// Test context for projection scenarios.
#[derive(Debug, Default, World)]
#[world(init = Self::new)]
pub struct ProjectionWorld {
    messages: Vec<Message>,
    loaded_initial: bool,
    projections: Vec<Option<Arc<[Iteration]>>>,
    table: Option<Arc<IterationTable>>,
}

impl ProjectionWorld {
    fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> SubfeedSnapshot {
        SubfeedSnapshot {
            messages: Arc::new(self.messages.clone()),
            loaded_initial: self.loaded_initial,
            version: 1,
        }
    }

    fn iterations(&self) -> &Arc<[Iteration]> {
        self.projections
            .last()
            .expect("No projection made")
            .as_ref()
            .expect("Projection is absent")
    }

    fn table(&self) -> &IterationTable {
        self.table.as_ref().expect("Iterations not tabulated")
    }

    fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        self.table().rows[row].get(column)
    }
}

// ==========================================================================
// Given
// ==========================================================================

#[given("a subfeed with messages:")]
async fn given_messages(world: &mut ProjectionWorld, step: &Step) {
    let lines = step.docstring.as_deref().expect("Step needs a docstring");
    world.messages = parse_lines(lines).expect("Fixture messages should decode");
}

#[given("an empty subfeed")]
async fn given_empty(world: &mut ProjectionWorld) {
    world.messages.clear();
}

#[given("the initial load is complete")]
async fn given_loaded(world: &mut ProjectionWorld) {
    world.loaded_initial = true;
}

#[given("the initial load is not complete")]
async fn given_not_loaded(world: &mut ProjectionWorld) {
    world.loaded_initial = false;
}

// ==========================================================================
// When
// ==========================================================================

#[when("the iterations are projected")]
async fn when_projected(world: &mut ProjectionWorld) {
    let mut projector = IterationProjector::new();
    world.projections = vec![projector.project(&world.snapshot())];
}

#[when("the iterations are projected twice")]
async fn when_projected_twice(world: &mut ProjectionWorld) {
    let mut projector = IterationProjector::new();
    let snapshot = world.snapshot();
    world.projections = vec![projector.project(&snapshot), projector.project(&snapshot)];
}

#[when("the iterations are tabulated")]
async fn when_tabulated(world: &mut ProjectionWorld) {
    let mut projector = IterationProjector::new();
    let iterations = projector
        .project(&world.snapshot())
        .expect("Projection is absent");
    world.table = Some(TableProjector::new().tabulate(&iterations));
}

// ==========================================================================
// Then
// ==========================================================================

#[then("the projection is absent")]
async fn then_absent(world: &mut ProjectionWorld) {
    assert!(matches!(world.projections.last(), Some(None)));
}

#[then(expr = "{int} iterations are projected")]
async fn then_count(world: &mut ProjectionWorld, count: usize) {
    assert_eq!(world.iterations().len(), count);
}

#[then(expr = "iteration {int} is on chain {string}")]
async fn then_chain(world: &mut ProjectionWorld, index: usize, chain: String) {
    assert_eq!(world.iterations()[index].chain_id.to_string(), chain);
}

#[then("both projections are the same instance")]
async fn then_same_instance(world: &mut ProjectionWorld) {
    let [Some(first), Some(second)] = world.projections.as_slice() else {
        panic!("Expected two present projections");
    };
    assert!(Arc::ptr_eq(first, second));
}

#[then(expr = "the columns are {string}")]
async fn then_columns(world: &mut ProjectionWorld, expected: String) {
    let keys: Vec<&str> = world.table().columns.iter().map(|c| c.key.as_str()).collect();
    assert_eq!(keys.join(", "), expected);
}

#[then(expr = "row {int} column {string} is the number {int}")]
async fn then_cell_number(world: &mut ProjectionWorld, row: usize, column: String, value: i64) {
    assert_eq!(world.cell(row, &column), Some(&CellValue::Raw(json!(value))));
}

#[then(expr = "row {int} column {string} is {string}")]
async fn then_cell_text(world: &mut ProjectionWorld, row: usize, column: String, value: String) {
    let cell = world.cell(row, &column).expect("Cell missing");
    assert_eq!(cell.to_string(), value);
}

#[then(expr = "row {int} has no column {string}")]
async fn then_no_cell(world: &mut ProjectionWorld, row: usize, column: String) {
    assert_eq!(world.cell(row, &column), None);
}

#[then(expr = "row {int} has key {string}")]
async fn then_row_key(world: &mut ProjectionWorld, row: usize, key: String) {
    assert_eq!(world.table().rows[row].key, key);
}

#[then(expr = "there are {int} rows")]
async fn then_row_count(world: &mut ProjectionWorld, count: usize) {
    assert_eq!(world.table().rows.len(), count);
}
