//! runview: Render a run page from local fixtures
//!
//! Loads the run list and the run's subfeed from disk, then prints the run
//! page as the configured extensions render it.
//!
//! ## Usage
//! ```text
//! runview <run-id>
//! ```
//!
//! ## Configuration
//! - runview.yaml / RUNVIEW_CONFIG: configuration file (optional)
//! - RUNVIEW__WORKSPACE__RUNS_PATH: run list JSON (default: runs.json)
//! - RUNVIEW__FEEDS__ROOT: subfeed fixture directory (default: feeds)
//! - RUNVIEW__EXTENSIONS__ENABLED: comma-separated extension names
//! - RUNVIEW_LOG: tracing filter (default: info)

use std::sync::Arc;

use tracing::{error, info};

use runview::config::Config;
use runview::extensions::ExtensionRegistry;
use runview::feed::FileSubfeedSource;
use runview::utils::bootstrap::init_tracing;
use runview::view::{LoggingRouteDispatch, RunPage};
use runview::widgets::PlainTextTable;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let run_id = std::env::args()
        .nth(1)
        .ok_or("usage: runview <run-id>")?;

    let config = Config::load(None).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;
    let workspace = config.workspace.load_runs()?;

    let source = Arc::new(FileSubfeedSource::new(&config.feeds.root));
    let registry = Arc::new(ExtensionRegistry::from_config(
        &config.extensions,
        Arc::new(PlainTextTable),
    ));

    info!(
        run_id = %run_id,
        runs = workspace.runs.len(),
        feeds_root = %config.feeds.root.display(),
        "runview started"
    );

    let mut page = RunPage::open(
        &workspace,
        &run_id,
        source,
        registry,
        Arc::new(LoggingRouteDispatch),
    )
    .await?;

    println!("{}", page.render());
    Ok(())
}
