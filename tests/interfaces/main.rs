//! Interface tests for the run view using Cucumber.
//!
//! Each feature file pairs with a world in `steps`:
//!
//! ```bash
//! cargo test --test interfaces
//! ```

mod steps;

use cucumber::World;
use steps::feed_address::FeedAddressWorld;
use steps::iteration_projection::ProjectionWorld;
use steps::run_page::RunPageWorld;

const FEATURES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/interfaces/features");

#[tokio::main]
async fn main() {
    println!("\n=== Running Feed Address Interface Tests ===\n");
    FeedAddressWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit(format!("{}/feed_address.feature", FEATURES))
        .await;

    println!("\n=== Running Iteration Projection Interface Tests ===\n");
    ProjectionWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit(format!("{}/iteration_projection.feature", FEATURES))
        .await;

    println!("\n=== Running Run Page Interface Tests ===\n");
    RunPageWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit(format!("{}/run_page.feature", FEATURES))
        .await;
}
