//! Runview - iteration feed projection for run pages
//!
//! Resolves a run's subfeed, filters the subfeed down to iteration records,
//! and projects them into a dynamically-shaped table for run-view
//! extensions.
//!
//! ```text
//! Run.uri --resolve--> SubfeedAddress --SubfeedSource--> SubfeedSnapshot
//!     --IterationProjector--> [Iteration] --extensions--> panels
//! ```

pub mod config;
pub mod extensions;
pub mod feed;
pub mod model;
pub mod projection;
pub mod utils;
pub mod view;
pub mod widgets;

pub use feed::{resolve, SubfeedAddress, SubfeedSnapshot, SubfeedSource, Subscription};
pub use model::{ChainId, Iteration, Message, Run, WorkspaceState};
pub use projection::{tabulate, IterationProjector, IterationTable, TableProjector};
pub use view::{RunPage, RunPageView};
