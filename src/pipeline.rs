//! One run of the tool: inspect, diff, generate, confirm, commit, push.

use std::path::PathBuf;

use colored::Colorize;
use git2::{Oid, Repository};
use tracing::{debug, info};

use crate::commit::{
    GenerationOptions, MessageGenerator, commit_changes, push_current_branch, stage_all,
    stage_paths,
};
use crate::config::Settings;
use crate::error::RunError;
use crate::git::{DiffRequest, WorkspaceStatus, collect_diff, inspect, open_repository};
use crate::ui::{Confirmation, Progress, Prompter, confirm_message};

/// Per-invocation switches, mostly from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    pub repo_path: PathBuf,
    /// Print the generated message and stop before confirming.
    pub dry_run: bool,
    /// Print the collected diff before generating.
    pub show_diff: bool,
    /// Use the fallback message without calling a model.
    pub no_ai: bool,
    /// Push the new commit to `origin`.
    pub push: bool,
    /// Stage every unstaged change before diffing.
    pub stage_all: bool,
    /// Choose which unstaged files to stage before diffing.
    pub select: bool,
}

/// How a run ended, when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Clean workspace.
    NothingToCommit,
    /// Changes exist but produced no diff text (e.g. only lock files changed).
    NoDiff,
    DryRun { message: String },
    Aborted,
    Committed {
        oid: Oid,
        message: String,
        /// Branch pushed to `origin`, when a push was requested.
        pushed: Option<String>,
    },
}

/// Execute the full pipeline against the repository at `request.repo_path`.
pub async fn run(
    request: &RunRequest,
    settings: &Settings,
    generator: &MessageGenerator,
    prompter: &dyn Prompter,
    progress: &Progress,
) -> Result<RunOutcome, RunError> {
    let repo = open_repository(&request.repo_path)?;
    let mut status = inspect(&repo)?;

    if !status.has_changes() {
        progress.success("No changes to commit. Working tree clean.");
        return Ok(RunOutcome::NothingToCommit);
    }

    if status.has_unstaged_changes() {
        if request.stage_all || settings.auto_stage {
            info!("Staging all changes");
            stage_all(&repo)?;
            status = inspect(&repo)?;
        } else if request.select {
            let files = prompter.select_files(&status.unstaged_paths())?;
            if files.is_empty() && !status.has_staged_changes() {
                progress.warn("No files selected.");
                return Ok(RunOutcome::Aborted);
            }
            stage_paths(&repo, &files)?;
            status = inspect(&repo)?;
        }
    }

    print_summary(progress, &status);

    let diff = collect_diff(&repo, &DiffRequest::for_status(&status, settings))?;
    if diff.trim().is_empty() {
        progress.warn("No diff content to summarize.");
        return Ok(RunOutcome::NoDiff);
    }
    debug!("Collected diff: {} lines", diff.lines().count());

    if request.show_diff {
        progress.line(format!("\n{}\n{diff}", "Diff:".bold()));
    }

    let options = GenerationOptions::from_settings(settings, request.no_ai);
    let spinner = progress.spinner("Generating commit message...");
    let message = generator.generate(&diff, &options).await;
    spinner.stop();

    if request.dry_run {
        progress.line(format!("\n{}\n{}", "Dry run, message:".bold(), message.cyan()));
        return Ok(RunOutcome::DryRun { message });
    }

    let message = match confirm_message(prompter, &message, settings.commit_style.is_multiline())? {
        Confirmation::Accepted(message) => message,
        Confirmation::Aborted => {
            progress.warn("Commit aborted.");
            return Ok(RunOutcome::Aborted);
        }
    };

    let outcome = commit_changes(&repo, &message)?;
    progress.success(format!("Committed {}", short_id(outcome.oid)));

    let pushed = if request.push {
        Some(push(&repo, progress)?)
    } else {
        None
    };

    Ok(RunOutcome::Committed {
        oid: outcome.oid,
        message,
        pushed,
    })
}

fn push(repo: &Repository, progress: &Progress) -> Result<String, RunError> {
    let spinner = progress.spinner("Pushing to origin...");
    match push_current_branch(repo) {
        Ok(branch) => {
            spinner.succeed(format!("Pushed {branch} to origin"));
            Ok(branch)
        }
        Err(e) => {
            spinner.fail("Push failed; the commit was kept locally");
            Err(e.into())
        }
    }
}

fn print_summary(progress: &Progress, status: &WorkspaceStatus) {
    if !progress.is_enabled() {
        return;
    }

    let branch = status.branch.as_deref().unwrap_or("(detached)");
    let mut header = format!("On branch {}", branch.bold());
    if let Some(tracking) = status.tracking.as_deref() {
        header.push_str(&format!(
            " tracking {tracking} (ahead {}, behind {})",
            status.ahead, status.behind
        ));
    }
    progress.line(header);

    for (label, files) in [
        ("Staged", &status.staged),
        ("Modified", &status.modified),
        ("Created", &status.created),
        ("Deleted", &status.deleted),
    ] {
        if !files.is_empty() {
            progress.line(format!("  {label}: {}", files.len()));
        }
    }
}

fn short_id(oid: Oid) -> String {
    let mut id = oid.to_string();
    id.truncate(7);
    id
}
