//! Data model shared by the feed, projection and view layers.
//!
//! - `Run`: a run record as supplied by the workspace run registry
//! - `Message`: one entry on a subfeed, tagged by kind
//! - `Iteration`: the only message kind the projections care about

mod message;
mod run;

pub use message::{ChainId, Iteration, Message, ITERATION_KIND};
pub use run::{Run, WorkspaceState};
