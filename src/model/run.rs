//! Run records.

use serde::{Deserialize, Serialize};

/// A run tracked by the workspace.
///
/// Owned by the run registry; this crate only reads `run_id` and `uri`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Stable identity within a workspace.
    pub run_id: String,
    /// Composite subfeed URI: `<scheme>/<part2>/<part3>/<subfeedName>`.
    #[serde(default)]
    pub uri: Option<String>,
    /// Human-readable label, if the registry supplies one.
    #[serde(default)]
    pub label: Option<String>,
}

impl Run {
    /// Create a run with an optional subfeed URI.
    pub fn new(run_id: impl Into<String>, uri: Option<&str>) -> Self {
        Self {
            run_id: run_id.into(),
            uri: uri.map(str::to_owned),
            label: None,
        }
    }
}

/// The slice of workspace state the run view reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceState {
    #[serde(default)]
    pub runs: Vec<Run>,
}

impl WorkspaceState {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    /// First run whose id matches.
    pub fn find_run(&self, run_id: &str) -> Option<&Run> {
        self.runs.iter().find(|r| r.run_id == run_id)
    }
}
