//! Configuration for phototriage.
//!
//! Settings are read from a TOML file, either given with `--config` or found
//! in the standard location:
//! - Linux: ~/.config/phototriage/config.toml
//! - macOS: ~/Library/Application Support/phototriage/config.toml
//! - Windows: %APPDATA%\phototriage\config.toml
//!
//! Every field has a default, so the file may set only what it needs.

use crate::triage_core::error::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application name used for config and data directories
const APP_NAME: &str = "phototriage";

const CONFIG_FILE_NAME: &str = "config.toml";

const CHECKPOINT_FILE_NAME: &str = "session.json";

/// Photos rated at or above this are skipped when moving forward.
pub const DEFAULT_SKIP_THRESHOLD: u8 = 4;

pub const DEFAULT_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

/// Standard configuration file path, if a config directory exists on this platform.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
}

fn pictures_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Pictures")))
        .unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the active collection; each child directory is a folder.
    pub photos_root: PathBuf,

    /// Root of the rejected collection, mirroring folder names.
    pub rejected_root: PathBuf,

    /// Minimum rating that is auto-skipped during forward navigation.
    pub skip_threshold: u8,

    /// Recognized image extensions, matched case-insensitively.
    pub image_extensions: Vec<String>,

    /// Folder names never offered for review.
    pub excluded_folders: Vec<String>,

    /// Where the resumable session checkpoint is kept.
    pub checkpoint_file: PathBuf,

    /// Program launched with the path of each displayed photo.
    pub viewer_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let pictures = pictures_dir();
        let checkpoint_file = dirs::data_local_dir()
            .map(|dir| dir.join(APP_NAME).join(CHECKPOINT_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(format!(".{}-{}", APP_NAME, CHECKPOINT_FILE_NAME)));

        Config {
            photos_root: pictures.join("photos"),
            rejected_root: pictures.join("photo-low"),
            skip_threshold: DEFAULT_SKIP_THRESHOLD,
            image_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            excluded_folders: Vec::new(),
            checkpoint_file,
            viewer_command: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TriageError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| TriageError::Toml {
            path: path.to_path_buf(),
            source: e,
        })?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from an explicit path, else from the standard location when that
    /// file exists, else fall back to defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => {
                log::debug!("No config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    /// Normalize and sanity-check the configuration.
    pub fn validate(mut self) -> Result<Self> {
        self.image_extensions = self
            .image_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self.image_extensions.sort();
        self.image_extensions.dedup();

        if self.image_extensions.is_empty() {
            return Err(TriageError::Config(
                "image_extensions must name at least one extension".to_string(),
            ));
        }

        if self.photos_root == self.rejected_root {
            return Err(TriageError::Config(format!(
                "photos_root and rejected_root must differ (both are {})",
                self.photos_root.display()
            )));
        }

        if self.skip_threshold > 5 {
            log::warn!(
                "skip_threshold {} is above the highest rating; nothing will be skipped",
                self.skip_threshold
            );
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.skip_threshold, 4);
        assert_eq!(config.image_extensions.len(), 5);
        assert!(config.excluded_folders.is_empty());
        assert!(config.photos_root.ends_with("photos"));
        assert!(config.rejected_root.ends_with("photo-low"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("config.toml");
        file.write_str(
            r#"
photos_root = "/srv/photos"
skip_threshold = 3
excluded_folders = ["theframe"]
"#,
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.photos_root, PathBuf::from("/srv/photos"));
        assert_eq!(config.skip_threshold, 3);
        assert_eq!(config.excluded_folders, vec!["theframe"]);
        assert_eq!(config.image_extensions, Config::default().image_extensions);
    }

    #[test]
    fn test_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("config.toml");
        file.write_str("skip_threshold = \"high\"").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, TriageError::Toml { .. }));
    }

    #[test]
    fn test_validate_normalizes_extensions() {
        let config = Config {
            image_extensions: vec![".JPG".into(), "jpg".into(), " png ".into(), "".into()],
            ..Config::default()
        };
        let config = config.validate().unwrap();
        assert_eq!(config.image_extensions, vec!["jpg", "png"]);
    }

    #[test]
    fn test_validate_rejects_same_roots() {
        let config = Config {
            photos_root: PathBuf::from("/p"),
            rejected_root: PathBuf::from("/p"),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(TriageError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_extensions() {
        let config = Config {
            image_extensions: vec![],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
