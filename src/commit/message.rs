//! Commit message cleanup and conventional-commit validation.

use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;

/// Subject used whenever AI generation is disabled, fails, or produces invalid output.
pub const FALLBACK_MESSAGE: &str = "chore: update files";

/// Hard limit on the subject line, ellipsis included.
pub const MAX_SUBJECT_LENGTH: usize = 72;

const ELLIPSIS: &str = "...";

/// Valid conventional commit types, in the order the prompt lists them.
pub const COMMIT_TYPES: &[&str] = &[
    "feat", "fix", "chore", "docs", "refactor", "test", "style", "perf", "ci", "build",
];

static CONVENTIONAL_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(feat|fix|chore|docs|refactor|test|style|perf|ci|build)(\(.+\))?: .+")
        .expect("Invalid regex")
});

static LEADING_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(suggested\s+)?commit(\s+message)?\s*:\s*").expect("Invalid regex")
});

/// A commit message split into subject and optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub subject: String,
    pub body: Option<String>,
}

impl CommitMessage {
    /// Split text at the first line; the body is everything after the blank separator.
    pub fn parse(text: &str) -> CommitMessage {
        let text = text.trim();
        let (subject, rest) = match text.split_once('\n') {
            Some((subject, rest)) => (subject, rest),
            None => (text, ""),
        };
        let body = rest.trim();
        CommitMessage {
            subject: subject.trim().to_string(),
            body: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    /// Format for git: subject, blank line, body.
    pub fn format(&self) -> String {
        match self.body.as_deref() {
            Some(body) if !body.trim().is_empty() => {
                format!("{}\n\n{}", self.subject, body.trim())
            }
            _ => self.subject.clone(),
        }
    }
}

/// Why a message cannot be used as the final commit message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageProblem {
    Empty,
    NotConventional,
    SubjectTooLong(usize),
}

impl fmt::Display for MessageProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageProblem::Empty => write!(f, "Commit message cannot be empty"),
            MessageProblem::NotConventional => write!(
                f,
                "Use conventional commits format: <type>(<scope>): <description> with type one of {}",
                COMMIT_TYPES.join(", ")
            ),
            MessageProblem::SubjectTooLong(len) => write!(
                f,
                "Subject is {len} chars (max {MAX_SUBJECT_LENGTH})"
            ),
        }
    }
}

pub fn is_conventional_subject(subject: &str) -> bool {
    CONVENTIONAL_SUBJECT.is_match(subject)
}

/// Check a candidate final message: conventional subject within the length limit.
pub fn validate_message(message: &str) -> Result<(), MessageProblem> {
    let parsed = CommitMessage::parse(message);
    if parsed.subject.is_empty() {
        return Err(MessageProblem::Empty);
    }
    if !is_conventional_subject(&parsed.subject) {
        return Err(MessageProblem::NotConventional);
    }
    let len = parsed.subject.chars().count();
    if len > MAX_SUBJECT_LENGTH {
        return Err(MessageProblem::SubjectTooLong(len));
    }
    Ok(())
}

/// Truncate a subject to [`MAX_SUBJECT_LENGTH`] chars, ending in an ellipsis.
pub fn clamp_subject(subject: &str) -> String {
    if subject.chars().count() <= MAX_SUBJECT_LENGTH {
        return subject.to_string();
    }
    let keep = MAX_SUBJECT_LENGTH - ELLIPSIS.len();
    let mut out: String = subject.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str(ELLIPSIS);
    out
}

/// Strip the decorations models like to add around a commit message.
///
/// Removes code-fence lines, wrapping quotes/backticks/emphasis, and a leading
/// "Commit message:" label. Keeps only the first line unless `keep_body`.
pub fn clean_model_output(raw: &str, keep_body: bool) -> CommitMessage {
    let unfenced: Vec<&str> = raw
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();
    let text = unfenced.join("\n");

    let text = strip_wrapping(text.trim());
    let text = LEADING_LABEL.replace(text, "");
    let text = strip_wrapping(text.trim());

    let mut lines = text.lines().map(str::trim_end).skip_while(|l| l.trim().is_empty());
    let subject = lines.next().map(|l| strip_wrapping(l.trim())).unwrap_or("");

    let body = if keep_body {
        let rest: Vec<&str> = lines.collect();
        let body = rest.join("\n");
        let body = body.trim_matches('\n').trim();
        (!body.is_empty()).then(|| body.to_string())
    } else {
        None
    };

    CommitMessage {
        subject: subject.to_string(),
        body,
    }
}

fn strip_wrapping(text: &str) -> &str {
    text.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*'))
        .trim()
}
