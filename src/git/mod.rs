//! Git workspace queries using git2-rs.

pub mod diff;
pub mod status;

pub use diff::{DiffRequest, collect_diff, truncate_lines};
pub use status::{WorkspaceStatus, current_branch, inspect, open_repository};
