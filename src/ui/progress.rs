//! Terminal output: spinners and status lines.

use std::borrow::Cow;
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Where user-facing progress goes. Hidden output prints nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    enabled: bool,
}

impl Progress {
    pub fn terminal() -> Self {
        Self { enabled: true }
    }

    pub fn hidden() -> Self {
        Self { enabled: false }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn spinner(&self, message: impl Into<Cow<'static, str>>) -> Spinner {
        if !self.enabled {
            return Spinner {
                bar: ProgressBar::hidden(),
                visible: false,
            };
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "),
        );
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));
        Spinner {
            bar: pb,
            visible: true,
        }
    }

    pub fn line(&self, text: impl AsRef<str>) {
        if self.enabled {
            println!("{}", text.as_ref());
        }
    }

    pub fn success(&self, text: impl AsRef<str>) {
        self.line(format!("{} {}", "✓".green().bold(), text.as_ref()));
    }

    pub fn warn(&self, text: impl AsRef<str>) {
        if self.enabled {
            eprintln!("{} {}", "⚠".yellow().bold(), text.as_ref().yellow());
        }
    }
}

/// A running spinner. Must be finished with one of its methods.
pub struct Spinner {
    bar: ProgressBar,
    visible: bool,
}

impl Spinner {
    pub fn succeed(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        if self.visible {
            println!("{} {}", "✓".green().bold(), message.as_ref());
        }
    }

    pub fn fail(self, message: impl AsRef<str>) {
        self.bar.finish_and_clear();
        if self.visible {
            eprintln!("{} {}", "✗".red().bold(), message.as_ref());
        }
    }

    pub fn stop(self) {
        self.bar.finish_and_clear();
    }
}
