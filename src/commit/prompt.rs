//! Prompt construction for AI-generated commit messages.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::commit::message::{COMMIT_TYPES, MAX_SUBJECT_LENGTH};
use crate::config::CommitStyle;

static ANSI_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("Invalid regex"));

/// Build the prompt sent to the model for one diff.
///
/// The diff is sanitized and clamped to `budget_chars`; when clamped, a note
/// with the original size follows it.
pub fn build_prompt(diff: &str, style: CommitStyle, budget_chars: usize) -> String {
    let sanitized = sanitize_diff(diff);
    let total = sanitized.chars().count();
    let clamped = clamp_chars(&sanitized, budget_chars);

    let truncation_note = if total > budget_chars {
        format!("\n\n[Note: Diff truncated to {budget_chars} characters from {total} total]")
    } else {
        String::new()
    };

    let types = COMMIT_TYPES.join(", ");
    let (rules, examples) = match style {
        CommitStyle::Conventional => (
            format!(
                "1. Use conventional commits format: <type>(<optional scope>): <description>
2. Valid types: {types}
3. Maximum {MAX_SUBJECT_LENGTH} characters total
4. Be specific about what changed (not just \"update files\")
5. No emojis, no quotes, no markdown
6. One line only
7. Use imperative mood (e.g., \"add feature\" not \"added feature\")"
            ),
            "- feat: add user authentication with JWT
- fix(worker): resolve memory leak in worker threads
- refactor: simplify database query logic
- docs: update API documentation for v2 endpoints
- test: add unit tests for payment processing",
        ),
        CommitStyle::Simple => (
            format!(
                "1. Format: <type>: <short description>, no scope
2. Valid types: {types}
3. Keep it short, well under {MAX_SUBJECT_LENGTH} characters
4. No emojis, no quotes, no markdown
5. One line only
6. Use imperative mood"
            ),
            "- fix: handle empty config file
- feat: add dark mode toggle
- chore: bump dependencies",
        ),
        CommitStyle::Detailed => (
            format!(
                "1. First line: <type>(<optional scope>): <description>, at most {MAX_SUBJECT_LENGTH} characters
2. Valid types: {types}
3. Then one blank line, then a short body explaining WHY the change was made
4. Wrap body lines at 72 characters
5. No emojis, no quotes, no markdown
6. Use imperative mood in the first line"
            ),
            "- fix(session): reset idle timer on API calls

  Sessions expired during active use because only page loads
  refreshed the timer.",
        ),
    };

    format!(
        "Generate a commit message for the following git diff.

STRICT RULES:
{rules}

EXAMPLES:
{examples}

Git diff:
{clamped}{truncation_note}

Output ONLY the commit message, nothing else."
    )
}

/// Remove terminal escape sequences and control characters, keeping newlines and tabs.
pub fn sanitize_diff(text: &str) -> String {
    ANSI_ESCAPE
        .replace_all(text, "")
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

fn clamp_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
