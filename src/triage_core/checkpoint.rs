use crate::triage_core::error::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use time::OffsetDateTime;

/// A resumable review position: the photo last shown in a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub folder: String,
    pub filename: String,
    /// Index at the time of writing. Resume looks the filename up instead.
    #[serde(alias = "index", default)]
    pub position_hint: usize,
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<OffsetDateTime>,
}

impl Checkpoint {
    pub fn new(folder: &str, filename: &str, position_hint: usize) -> Self {
        Checkpoint {
            folder: folder.to_string(),
            filename: filename.to_string(),
            position_hint,
            saved_at: Some(OffsetDateTime::now_utc()),
        }
    }
}

/// Persistence for the single resumable checkpoint.
pub trait CheckpointStore {
    fn load(&self) -> Result<Option<Checkpoint>>;
    fn save(&mut self, checkpoint: &Checkpoint) -> Result<()>;
    fn clear(&mut self) -> Result<()>;
}

/// Keeps the checkpoint as a small JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonCheckpointStore {
    path: PathBuf,
}

impl JsonCheckpointStore {
    pub fn new(path: &Path) -> Self {
        JsonCheckpointStore {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CheckpointStore for JsonCheckpointStore {
    /// A missing or unparseable file means there is nothing to resume.
    fn load(&self) -> Result<Option<Checkpoint>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(checkpoint) => Ok(Some(checkpoint)),
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable checkpoint {}: {}",
                    self.path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    fn save(&mut self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(checkpoint)?)?;
        fs::rename(&tmp, &self.path)?;

        log::trace!(
            "Checkpoint saved: {}/{} (#{})",
            checkpoint.folder,
            checkpoint.filename,
            checkpoint.position_hint
        );
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                log::debug!("Checkpoint cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[test]
    fn test_missing_file_is_none() {
        let temp = TempDir::new().unwrap();
        let store = JsonCheckpointStore::new(&temp.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_save_load_clear() {
        let temp = TempDir::new().unwrap();
        let mut store = JsonCheckpointStore::new(&temp.path().join("state/session.json"));

        let checkpoint = Checkpoint::new("2024", "b.jpg", 1);
        store.save(&checkpoint).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.folder, "2024");
        assert_eq!(loaded.filename, "b.jpg");
        assert_eq!(loaded.position_hint, 1);
        assert!(loaded.saved_at.is_some());

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_legacy_index_key() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("session.json");
        file.write_str(r#"{"folder":"2023","filename":"x.jpg","index":7}"#)
            .unwrap();

        let store = JsonCheckpointStore::new(file.path());
        let checkpoint = store.load().unwrap().unwrap();
        assert_eq!(checkpoint.folder, "2023");
        assert_eq!(checkpoint.filename, "x.jpg");
        assert_eq!(checkpoint.position_hint, 7);
        assert_eq!(checkpoint.saved_at, None);
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("session.json");
        file.write_str("{not json").unwrap();

        let store = JsonCheckpointStore::new(file.path());
        assert_eq!(store.load().unwrap(), None);
    }
}
