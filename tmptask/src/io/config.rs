//! Temp file defaults loaded from TOML.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::path::PathRequest;
use crate::io::atomic::write_atomic;

/// Defaults for constructing temp file tasks.
///
/// Missing fields fall back to [`TmpFileConfig::default`], so an empty file is
/// a valid config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TmpFileConfig {
    /// File name before the random fragment and extension.
    pub stem: String,

    /// Appended verbatim; include the leading dot.
    pub extension: String,

    /// Parent directory. Empty means the system temp directory.
    pub base_dir: PathBuf,

    /// Insert a random fragment after the stem.
    pub include_random: bool,

    /// Delete the file when its collection completes normally.
    pub transient: bool,
}

impl Default for TmpFileConfig {
    fn default() -> Self {
        Self {
            stem: "tmp".to_string(),
            extension: String::new(),
            base_dir: PathBuf::new(),
            include_random: true,
            transient: true,
        }
    }
}

impl TmpFileConfig {
    pub fn validate(&self) -> Result<()> {
        if self.stem.contains(std::path::is_separator) {
            return Err(anyhow!("stem must not contain a path separator"));
        }
        if self.extension.contains(std::path::is_separator) {
            return Err(anyhow!("extension must not contain a path separator"));
        }
        Ok(())
    }

    pub fn path_request(&self) -> PathRequest {
        PathRequest::new(self.stem.clone(), self.extension.clone())
            .base(self.base_dir.clone())
            .include_random(self.include_random)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `TmpFileConfig::default()`.
pub fn load_config(path: &Path) -> Result<TmpFileConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "config missing, using defaults");
        let cfg = TmpFileConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TmpFileConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &TmpFileConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    write_atomic(path, &buf).with_context(|| format!("write config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, TmpFileConfig::default());
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("tmptask.toml");
        let cfg = TmpFileConfig {
            stem: "build".to_string(),
            extension: ".log".to_string(),
            base_dir: temp.path().to_path_buf(),
            include_random: false,
            transient: false,
        };
        write_config(&path, &cfg).expect("write");
        assert_eq!(load_config(&path).expect("load"), cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("tmptask.toml");
        fs::write(&path, "extension = \".json\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.extension, ".json");
        assert_eq!(cfg.stem, "tmp");
        assert!(cfg.include_random);
        assert!(cfg.transient);
    }

    #[test]
    fn stem_with_separator_is_rejected() {
        let cfg = TmpFileConfig {
            stem: "a/b".to_string(),
            ..TmpFileConfig::default()
        };
        let err = cfg.validate().expect_err("separator");
        assert!(err.to_string().contains("stem"));
    }
}
