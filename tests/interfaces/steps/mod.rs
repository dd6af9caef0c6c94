//! Cucumber step definitions for interface tests.

pub mod feed_address;
pub mod iteration_projection;
pub mod run_page;
