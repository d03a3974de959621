//! Layered settings: built-in defaults, then `~/.aicommrc`, then `./.aicommrc`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// File name looked up in the project directory and the home directory.
pub const CONFIG_FILE_NAME: &str = ".aicommrc";

const DEFAULT_MAX_DIFF_LINES: usize = 500;
const DEFAULT_TEMPERATURE: f32 = 0.2;
const DEFAULT_CONTEXT_LINES: u32 = 3;

const MAX_DIFF_LINES_RANGE: (i64, i64) = (10, 10_000);
const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);
const CONTEXT_LINES_RANGE: (i64, i64) = (0, 20);

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenRouter,
    Ollama,
    Gemini,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "OpenRouter",
            ProviderKind::Ollama => "Ollama",
            ProviderKind::Gemini => "Gemini",
        }
    }

    /// Model used when no `model` key is configured.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenRouter => "google/gemini-2.0-flash-exp:free",
            ProviderKind::Ollama => "llama3.2",
            ProviderKind::Gemini => "gemini-1.5-flash",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the generated commit message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommitStyle {
    /// Single conventional-commit subject line.
    #[default]
    Conventional,
    /// Single subject line with a shorter instruction set.
    Simple,
    /// Subject line plus a body explaining the change.
    Detailed,
}

impl CommitStyle {
    /// Whether the message may carry body lines after the subject.
    pub fn is_multiline(&self) -> bool {
        matches!(self, CommitStyle::Detailed)
    }
}

/// Effective settings for one run. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub provider: ProviderKind,
    pub model: String,
    pub max_diff_lines: usize,
    pub temperature: f32,
    pub commit_style: CommitStyle,
    pub auto_stage: bool,
    pub exclude_lock_files: bool,
    pub context_lines: u32,
}

impl Default for Settings {
    fn default() -> Self {
        let provider = ProviderKind::OpenRouter;
        Self {
            provider,
            model: provider.default_model().to_string(),
            max_diff_lines: DEFAULT_MAX_DIFF_LINES,
            temperature: DEFAULT_TEMPERATURE,
            commit_style: CommitStyle::default(),
            auto_stage: false,
            exclude_lock_files: true,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }
}

/// Raw contents of one settings file; every key optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    provider: Option<ProviderKind>,
    model: Option<String>,
    max_diff_lines: Option<i64>,
    temperature: Option<f64>,
    commit_style: Option<CommitStyle>,
    auto_stage: Option<bool>,
    exclude_lock_files: Option<bool>,
    context_lines: Option<i64>,
    #[serde(flatten)]
    unknown: BTreeMap<String, serde_json::Value>,
}

/// Merged, range-checked layer values.
#[derive(Debug, Default)]
struct Layer {
    provider: Option<ProviderKind>,
    model: Option<String>,
    max_diff_lines: Option<usize>,
    temperature: Option<f32>,
    commit_style: Option<CommitStyle>,
    auto_stage: Option<bool>,
    exclude_lock_files: Option<bool>,
    context_lines: Option<u32>,
}

impl Layer {
    /// Overlay `other` on top of `self`; keys set in `other` win.
    fn merge(self, other: Layer) -> Layer {
        Layer {
            provider: other.provider.or(self.provider),
            model: other.model.or(self.model),
            max_diff_lines: other.max_diff_lines.or(self.max_diff_lines),
            temperature: other.temperature.or(self.temperature),
            commit_style: other.commit_style.or(self.commit_style),
            auto_stage: other.auto_stage.or(self.auto_stage),
            exclude_lock_files: other.exclude_lock_files.or(self.exclude_lock_files),
            context_lines: other.context_lines.or(self.context_lines),
        }
    }
}

impl Settings {
    /// Load settings for the current directory and the user's home directory.
    pub fn load_default() -> Result<Settings, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
            path: PathBuf::from("."),
            source,
        })?;
        let home = dirs::home_dir();
        Settings::load(&cwd, home.as_deref())
    }

    /// Load settings with precedence project file > home file > defaults.
    ///
    /// Missing files are skipped. A file that exists but is not a valid JSON
    /// object, or that holds an out-of-range value, is a fatal error.
    pub fn load(project_dir: &Path, home_dir: Option<&Path>) -> Result<Settings, ConfigError> {
        let mut merged = Layer::default();

        if let Some(home) = home_dir {
            let user_path = home.join(CONFIG_FILE_NAME);
            // Same directory twice would apply one file as both layers.
            if home != project_dir {
                if let Some(layer) = read_layer(&user_path)? {
                    merged = merged.merge(layer);
                }
            }
        }

        if let Some(layer) = read_layer(&project_dir.join(CONFIG_FILE_NAME))? {
            merged = merged.merge(layer);
        }

        let defaults = Settings::default();
        let provider = merged.provider.unwrap_or(defaults.provider);
        Ok(Settings {
            provider,
            model: merged
                .model
                .unwrap_or_else(|| provider.default_model().to_string()),
            max_diff_lines: merged.max_diff_lines.unwrap_or(defaults.max_diff_lines),
            temperature: merged.temperature.unwrap_or(defaults.temperature),
            commit_style: merged.commit_style.unwrap_or(defaults.commit_style),
            auto_stage: merged.auto_stage.unwrap_or(defaults.auto_stage),
            exclude_lock_files: merged
                .exclude_lock_files
                .unwrap_or(defaults.exclude_lock_files),
            context_lines: merged.context_lines.unwrap_or(defaults.context_lines),
        })
    }

    /// Apply a `--model` override from the command line.
    pub fn with_model_override(mut self, model: Option<String>) -> Settings {
        if let Some(model) = model.filter(|m| !m.trim().is_empty()) {
            self.model = model;
        }
        self
    }
}

/// Read and validate one settings file. `Ok(None)` when the file does not exist.
fn read_layer(path: &Path) -> Result<Option<Layer>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    debug!("Loading settings from {}", path.display());
    parse_layer(&raw, path).map(Some)
}

fn parse_layer(raw: &str, path: &Path) -> Result<Layer, ConfigError> {
    let file: SettingsFile =
        serde_json::from_str(raw).map_err(|source| ConfigError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })?;

    for key in file.unknown.keys() {
        warn!("Ignoring unknown key '{}' in {}", key, path.display());
    }

    let max_diff_lines = file
        .max_diff_lines
        .map(|v| check_int(path, "maxDiffLines", v, MAX_DIFF_LINES_RANGE, "an integer in 10..=10000"))
        .transpose()?;

    let context_lines = file
        .context_lines
        .map(|v| check_int(path, "contextLines", v, CONTEXT_LINES_RANGE, "an integer in 0..=20"))
        .transpose()?;

    let temperature = match file.temperature {
        Some(t) if t.is_finite() && t >= TEMPERATURE_RANGE.0 && t <= TEMPERATURE_RANGE.1 => {
            Some(t as f32)
        }
        Some(t) => {
            return Err(ConfigError::OutOfRange {
                path: path.to_path_buf(),
                key: "temperature",
                value: t.to_string(),
                expected: "a number in 0..=2",
            });
        }
        None => None,
    };

    let model = match file.model {
        Some(m) if m.trim().is_empty() => {
            return Err(ConfigError::OutOfRange {
                path: path.to_path_buf(),
                key: "model",
                value: format!("{m:?}"),
                expected: "a non-empty model id",
            });
        }
        other => other,
    };

    Ok(Layer {
        provider: file.provider,
        model,
        max_diff_lines: max_diff_lines.map(|v| v as usize),
        temperature,
        commit_style: file.commit_style,
        auto_stage: file.auto_stage,
        exclude_lock_files: file.exclude_lock_files,
        context_lines: context_lines.map(|v| v as u32),
    })
}

fn check_int(
    path: &Path,
    key: &'static str,
    value: i64,
    (min, max): (i64, i64),
    expected: &'static str,
) -> Result<i64, ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            path: path.to_path_buf(),
            key,
            value: value.to_string(),
            expected,
        });
    }
    Ok(value)
}
