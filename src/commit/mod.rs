//! Commit message generation, staging, committing and pushing.

pub mod executor;
pub mod generator;
pub mod message;
pub mod prompt;
pub mod push;

pub use executor::{CommitOutcome, commit_changes, stage_all, stage_paths};
pub use generator::{GenerationOptions, MessageGenerator};
pub use message::{FALLBACK_MESSAGE, MAX_SUBJECT_LENGTH, validate_message};
pub use push::push_current_branch;
