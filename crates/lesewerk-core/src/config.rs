// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::TargetDpi;

/// File name of the persisted settings inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent application settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Languages pre-selected on the extract page, in priority order.
    pub default_languages: Vec<String>,
    /// Resolution the slider starts at.
    pub default_target_dpi: TargetDpi,
    /// Explicit recognition engine executable. When unset the engine is
    /// located by platform probing at startup.
    pub tesseract_path: Option<PathBuf>,
    /// Collapse runs of whitespace in extracted text.
    pub normalize_whitespace: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_languages: vec!["eng".into()],
            default_target_dpi: TargetDpi::default(),
            tesseract_path: None,
            normalize_whitespace: true,
        }
    }
}

impl AppConfig {
    /// Load settings from `dir`. Missing or unreadable files yield `None`.
    pub fn load(dir: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(dir.join(CONFIG_FILE)).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Write settings to `dir` as pretty-printed JSON.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(CONFIG_FILE), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_extract_page() {
        let config = AppConfig::default();
        assert_eq!(config.default_languages, vec!["eng".to_string()]);
        assert_eq!(config.default_target_dpi.get(), 300);
        assert!(config.tesseract_path.is_none());
        assert!(config.normalize_whitespace);
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            default_languages: vec!["fra".into(), "eng".into()],
            default_target_dpi: TargetDpi::new(432).unwrap(),
            tesseract_path: Some(PathBuf::from("/opt/tesseract/bin/tesseract")),
            normalize_whitespace: false,
        };
        config.persist(dir.path()).unwrap();
        assert_eq!(AppConfig::load(dir.path()), Some(config));
    }

    #[test]
    fn load_missing_or_corrupt_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(dir.path()).is_none());
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(AppConfig::load(dir.path()).is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"default_target_dpi": 144}"#).unwrap();
        assert_eq!(config.default_target_dpi.get(), 144);
        assert_eq!(config.default_languages, vec!["eng".to_string()]);
    }
}
