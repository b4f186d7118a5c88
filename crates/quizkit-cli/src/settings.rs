//! User settings, persisted as TOML in the platform config directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use quizkit_editor::AutoSaveConfig;
use quizkit_model::QuestionType;
use serde::{Deserialize, Serialize};

/// CLI settings. Command-line flags take precedence over every field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub workspace: WorkspaceSettings,
    pub editor: EditorSettings,
    pub export: ExportSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceSettings {
    /// Workspace used when `--workspace` is not given.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Type for `question add` without `--type`.
    pub default_question_type: QuestionType,
    pub autosave: AutoSaveConfig,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            default_question_type: QuestionType::SingleSelect,
            autosave: AutoSaveConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Directory for `export` without a path. Defaults to the current
    /// directory.
    pub directory: Option<PathBuf>,
}

impl Settings {
    /// Load from the default path. A missing or unreadable file yields the
    /// defaults.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                if path.exists() {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring settings file");
                }
                Self::default()
            }
        }
    }

    /// Load from an explicit path. Unlike [`Settings::load`], a missing or
    /// malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read settings from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parse settings in {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create config directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("serialize settings")?;
        std::fs::write(path, content)
            .with_context(|| format!("write settings to {}", path.display()))
    }

    pub fn config_path() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("quizkit.toml"))
    }

    /// Workspace to open: the override, else the configured directory,
    /// else `workspace` under the platform data directory.
    pub fn workspace_dir(&self, overridden: Option<&Path>) -> PathBuf {
        if let Some(path) = overridden {
            return path.to_path_buf();
        }
        if let Some(path) = &self.workspace.directory {
            return path.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join("workspace"))
            .unwrap_or_else(|| PathBuf::from("quiz-workspace"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "quizkit", "quizkit")
}
