//! Interactive review of the generated message: accept, edit, or abort.

use colored::Colorize;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Editor, Input, MultiSelect, Select};

use crate::commit::validate_message;
use crate::error::ConfirmError;

/// The user's choice for a proposed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Accept,
    Edit,
    Abort,
}

/// Outcome of the confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Accepted(String),
    Aborted,
}

/// Source of user decisions. The terminal implementation uses dialoguer.
pub trait Prompter {
    fn choose_action(&self, message: &str) -> Result<Action, ConfirmError>;

    /// Let the user rewrite `initial`. Multi-line messages open an editor.
    fn edit_message(&self, initial: &str, multiline: bool) -> Result<String, ConfirmError>;

    /// Pick which of `files` to stage.
    fn select_files(&self, files: &[String]) -> Result<Vec<String>, ConfirmError>;

    /// Report a rejected edit before asking again.
    fn reject_edit(&self, reason: &str) {
        eprintln!("{} {}", "✗".red().bold(), reason.red());
    }
}

/// Present `generated` and resolve it to a final message or an abort.
///
/// Blank edited text fails with [`ConfirmError::EmptyMessage`]. Edited text
/// that is not a valid conventional commit is sent back for another edit.
pub fn confirm_message(
    prompter: &dyn Prompter,
    generated: &str,
    multiline: bool,
) -> Result<Confirmation, ConfirmError> {
    match prompter.choose_action(generated)? {
        Action::Accept => Ok(Confirmation::Accepted(generated.trim().to_string())),
        Action::Abort => Ok(Confirmation::Aborted),
        Action::Edit => {
            let mut draft = generated.to_string();
            loop {
                let edited = prompter.edit_message(&draft, multiline)?;
                let edited = edited.trim();
                if edited.is_empty() {
                    return Err(ConfirmError::EmptyMessage);
                }
                match validate_message(edited) {
                    Ok(()) => return Ok(Confirmation::Accepted(edited.to_string())),
                    Err(problem) => {
                        prompter.reject_edit(&problem.to_string());
                        draft = edited.to_string();
                    }
                }
            }
        }
    }
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn choose_action(&self, message: &str) -> Result<Action, ConfirmError> {
        println!("\n{}", "Generated commit message:".bold());
        for line in message.lines() {
            println!("  {}", line.cyan());
        }
        println!();

        let choice = Select::with_theme(&self.theme)
            .with_prompt("What would you like to do?")
            .items(&["Accept and commit", "Edit message", "Abort"])
            .default(0)
            .interact_opt()?;

        Ok(match choice {
            Some(0) => Action::Accept,
            Some(1) => Action::Edit,
            _ => Action::Abort,
        })
    }

    fn edit_message(&self, initial: &str, multiline: bool) -> Result<String, ConfirmError> {
        if multiline {
            let edited = Editor::new()
                .extension(".gitcommit")
                .edit(initial)
                .map_err(dialoguer::Error::from)?;
            // Closing the editor without saving keeps the draft.
            return Ok(edited.unwrap_or_else(|| initial.to_string()));
        }

        let edited: String = Input::with_theme(&self.theme)
            .with_prompt("Commit message")
            .with_initial_text(initial)
            .allow_empty(true)
            .interact_text()?;
        Ok(edited)
    }

    fn select_files(&self, files: &[String]) -> Result<Vec<String>, ConfirmError> {
        let defaults = vec![true; files.len()];
        let picked = MultiSelect::with_theme(&self.theme)
            .with_prompt("Select files to stage (space to toggle)")
            .items(files)
            .defaults(&defaults)
            .interact()?;

        Ok(picked.into_iter().map(|i| files[i].clone()).collect())
    }
}
