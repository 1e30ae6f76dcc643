use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// How to start an external tool: a program plus leading arguments
/// (e.g. `python3` with `-m yt_dlp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCommand {
    pub program: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Last output directory a run finished in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloader: Option<ToolCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcoder: Option<ToolCommand>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prober: Option<ToolCommand>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse settings at {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create settings directory {}", parent.display())
            })?;
        }
        let raw = serde_json::to_string_pretty(self).context("failed to encode settings")?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write settings at {}", path.display()))
    }

    /// Records the directory of a finished run; writes only when it changed.
    pub fn remember_output_dir(&mut self, path: &Path, dir: &Path) -> Result<()> {
        if self.output_dir.as_deref() == Some(dir) {
            return Ok(());
        }
        self.output_dir = Some(dir.to_path_buf());
        self.save(path)
    }
}
