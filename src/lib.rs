//! aicomm - A CLI tool that drafts conventional commit messages from your working tree.
//!
//! # Overview
//!
//! aicomm inspects the repository, collects the staged (or unstaged) diff, asks an
//! LLM provider (OpenRouter, Gemini or a local Ollama engine) for a one-line
//! conventional commit message, lets the user accept, edit or abort it, and then
//! commits and optionally pushes.

pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod llm;
pub mod pipeline;
pub mod ui;

// Re-export commonly used types
pub use commit::{FALLBACK_MESSAGE, GenerationOptions, MessageGenerator};
pub use config::{CommitStyle, ProviderKind, Settings};
pub use error::{
    CommitError, ConfigError, ConfirmError, DiffError, EnvironmentError, GenerationError,
    ProviderError, PushError, RunError,
};
pub use git::WorkspaceStatus;
pub use pipeline::{RunOutcome, RunRequest, run};
