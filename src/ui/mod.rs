//! User interaction: confirmation prompts and progress output.

pub mod confirm;
pub mod progress;

pub use confirm::{Action, Confirmation, Prompter, TerminalPrompter, confirm_message};
pub use progress::{Progress, Spinner};
