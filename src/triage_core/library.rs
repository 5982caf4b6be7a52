use crate::triage_core::catalog::{self, PhotoCatalog};
use crate::triage_core::config::Config;
use crate::triage_core::error::{Result, TriageError};
use crate::triage_core::mover::{self, PhotoMover};
use crate::triage_core::photo::{PhotoData, content_type_for, validate_name};
use crate::triage_core::rating::{RATING_HEADER_BYTES, RatingSource, extract_rating};
use std::{
    fs,
    io::Read,
    path::{Path, PathBuf},
};

/// A photo collection on local disk: dated folders under an active root,
/// with a mirrored tree under the rejected root.
#[derive(Debug, Clone)]
pub struct PhotoLibrary {
    photos_root: PathBuf,
    rejected_root: PathBuf,
    image_extensions: Vec<String>,
    excluded_folders: Vec<String>,
}

impl PhotoLibrary {
    pub fn new(config: &Config) -> Self {
        PhotoLibrary {
            photos_root: config.photos_root.clone(),
            rejected_root: config.rejected_root.clone(),
            image_extensions: config.image_extensions.clone(),
            excluded_folders: config.excluded_folders.clone(),
        }
    }

    pub fn photos_root(&self) -> &Path {
        &self.photos_root
    }

    pub fn rejected_root(&self) -> &Path {
        &self.rejected_root
    }

    /// Full path of a photo in the active collection.
    pub fn photo_path(&self, folder: &str, filename: &str) -> Result<PathBuf> {
        Ok(self
            .photos_root
            .join(validate_name(folder)?)
            .join(validate_name(filename)?))
    }

    /// Raw bytes and content type of a photo.
    pub fn read_photo(&self, folder: &str, filename: &str) -> Result<PhotoData> {
        let path = self.photo_path(folder, filename)?;
        if !path.is_file() {
            return Err(TriageError::PhotoNotFound(path));
        }

        let bytes = fs::read(&path)?;
        Ok(PhotoData {
            bytes,
            content_type: content_type_for(&path),
        })
    }

    /// Read the rating of a photo from its leading bytes.
    /// Fails with `RatingUnavailable` when the file cannot be read.
    pub fn read_rating(&self, folder: &str, filename: &str) -> Result<Option<u8>> {
        let path = self.photo_path(folder, filename)?;
        let unavailable = |reason: String| TriageError::RatingUnavailable {
            path: path.clone(),
            reason,
        };

        let file = fs::File::open(&path).map_err(|e| unavailable(e.to_string()))?;
        let mut header = Vec::with_capacity(RATING_HEADER_BYTES);
        file.take(RATING_HEADER_BYTES as u64)
            .read_to_end(&mut header)
            .map_err(|e| unavailable(e.to_string()))?;

        Ok(extract_rating(&header))
    }
}

impl PhotoCatalog for PhotoLibrary {
    fn list_folders(&self) -> Result<Vec<String>> {
        catalog::list_folders(&self.photos_root, &self.excluded_folders)
    }

    fn list_photos(&self, folder: &str) -> Result<Vec<String>> {
        let folder = validate_name(folder)?;
        catalog::list_photos(&self.photos_root.join(folder), &self.image_extensions)
    }
}

impl RatingSource for PhotoLibrary {
    fn rating(&self, folder: &str, filename: &str) -> Option<u8> {
        self.read_rating(folder, filename).unwrap_or_else(|e| {
            log::warn!("{}", e);
            None
        })
    }
}

impl PhotoMover for PhotoLibrary {
    fn move_to_rejected(&self, folder: &str, filename: &str) -> Result<PathBuf> {
        mover::move_photo(&self.photos_root, &self.rejected_root, folder, filename)
    }
}
