//! The review session state machine.
//!
//! A session walks the photos of one folder in modification-time order.
//! Moving forward skips photos already rated at or above the skip
//! threshold; moving back never does. Rejecting a photo moves its file to
//! the rejected collection and shows whichever photo now occupies the same
//! slot, again without skipping. Each displayed photo is checkpointed so a
//! later run can resume at the same file.

use crate::triage_core::catalog::PhotoCatalog;
use crate::triage_core::checkpoint::{Checkpoint, CheckpointStore};
use crate::triage_core::error::{Result, TriageError};
use crate::triage_core::mover::PhotoMover;
use crate::triage_core::photo::DisplayedPhoto;
use crate::triage_core::rating::RatingSource;

/// Everything a session needs from the photo collection.
pub trait PhotoBackend: PhotoCatalog + RatingSource + PhotoMover {}

impl<T: PhotoCatalog + RatingSource + PhotoMover> PhotoBackend for T {}

/// Where the session stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    FolderSelect,
    Displaying { folder: String, position: usize },
}

/// Outcome of a session operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A photo is now on screen.
    Displayed(DisplayedPhoto),
    /// The folder ran out of photos; the session is back at folder selection.
    Completed { folder: String },
}

/// The folder being reviewed. Only exists while a photo is displayed, and
/// then `position < photos.len()`.
#[derive(Debug)]
struct ActiveFolder {
    folder: String,
    photos: Vec<String>,
    position: usize,
}

pub struct ReviewSession<B, S> {
    backend: B,
    store: S,
    skip_threshold: u8,
    active: Option<ActiveFolder>,
}

impl<B: PhotoBackend, S: CheckpointStore> ReviewSession<B, S> {
    pub fn new(backend: B, store: S, skip_threshold: u8) -> Self {
        ReviewSession {
            backend,
            store,
            skip_threshold,
            active: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn skip_threshold(&self) -> u8 {
        self.skip_threshold
    }

    pub fn state(&self) -> SessionState {
        match &self.active {
            None => SessionState::FolderSelect,
            Some(active) => SessionState::Displaying {
                folder: active.folder.clone(),
                position: active.position,
            },
        }
    }

    /// The checkpoint a previous run left behind, if any.
    pub fn saved_checkpoint(&self) -> Option<Checkpoint> {
        self.store.load().unwrap_or_else(|e| {
            log::warn!("Could not read checkpoint: {}", e);
            None
        })
    }

    /// Forget the saved checkpoint.
    pub fn discard_checkpoint(&mut self) {
        if let Err(e) = self.store.clear() {
            log::warn!("Could not clear checkpoint: {}", e);
        }
    }

    fn ensure_idle(&self) -> Result<()> {
        match &self.active {
            Some(active) => Err(TriageError::SessionActive(active.folder.clone())),
            None => Ok(()),
        }
    }

    /// Begin reviewing `folder` from its first photo.
    pub fn start(&mut self, folder: &str) -> Result<Step> {
        self.ensure_idle()?;

        let photos = self.backend.list_photos(folder)?;
        if photos.is_empty() {
            return Err(TriageError::EmptyFolder(folder.to_string()));
        }

        log::info!("Starting review of '{}' ({} photos)", folder, photos.len());
        self.active = Some(ActiveFolder {
            folder: folder.to_string(),
            photos,
            position: 0,
        });
        self.advance_until_visible(true)
    }

    /// Continue at the photo named by `checkpoint`, looked up by filename in
    /// a fresh listing. A photo that has since disappeared restarts the
    /// folder from the beginning. A folder that is empty, gone or unusable
    /// discards the checkpoint.
    pub fn resume(&mut self, checkpoint: &Checkpoint) -> Result<Step> {
        self.ensure_idle()?;

        let photos = match self.backend.list_photos(&checkpoint.folder) {
            Ok(photos) => photos,
            Err(e @ (TriageError::CatalogUnavailable { .. } | TriageError::InvalidName(_))) => {
                log::warn!("Discarding checkpoint for '{}': {}", checkpoint.folder, e);
                self.discard_checkpoint();
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        if photos.is_empty() {
            self.discard_checkpoint();
            return Err(TriageError::EmptyFolder(checkpoint.folder.clone()));
        }

        let position = match photos.iter().position(|p| *p == checkpoint.filename) {
            Some(position) => position,
            None => {
                log::info!(
                    "{} is no longer in '{}', resuming from the start",
                    checkpoint.filename,
                    checkpoint.folder
                );
                0
            }
        };

        log::info!(
            "Resuming review of '{}' at {} ({} photos)",
            checkpoint.folder,
            position + 1,
            photos.len()
        );
        self.active = Some(ActiveFolder {
            folder: checkpoint.folder.clone(),
            photos,
            position,
        });
        self.advance_until_visible(true)
    }

    /// Resume from the stored checkpoint.
    pub fn resume_saved(&mut self) -> Result<Step> {
        let checkpoint = self.saved_checkpoint().ok_or(TriageError::NoCheckpoint)?;
        self.resume(&checkpoint)
    }

    /// Show the photo at the current position, first stepping past photos
    /// rated at or above the threshold when `skip` is set. Walking off the
    /// end completes the folder.
    fn advance_until_visible(&mut self, skip: bool) -> Result<Step> {
        let threshold = self.skip_threshold;
        let active = self.active.as_mut().ok_or(TriageError::NotReviewing)?;

        while let Some(filename) = active.photos.get(active.position) {
            let rating = self.backend.rating(&active.folder, filename);

            if skip && rating.is_some_and(|r| r >= threshold) {
                log::debug!(
                    "Skipping {}/{} (rated {})",
                    active.folder,
                    filename,
                    rating.unwrap_or_default()
                );
                active.position += 1;
                continue;
            }

            let shown = DisplayedPhoto {
                folder: active.folder.clone(),
                filename: filename.clone(),
                position: active.position,
                total: active.photos.len(),
                rating,
            };
            self.checkpoint(&shown);
            return Ok(Step::Displayed(shown));
        }

        Ok(self.complete())
    }

    fn checkpoint(&mut self, shown: &DisplayedPhoto) {
        let checkpoint = Checkpoint::new(&shown.folder, &shown.filename, shown.position);
        if let Err(e) = self.store.save(&checkpoint) {
            log::warn!("Could not save checkpoint: {}", e);
        }
    }

    fn complete(&mut self) -> Step {
        let folder = self
            .active
            .take()
            .map(|active| active.folder)
            .unwrap_or_default();
        self.discard_checkpoint();
        log::info!("Finished reviewing '{}'", folder);
        Step::Completed { folder }
    }

    /// Move forward one photo, skipping highly rated ones.
    pub fn next(&mut self) -> Result<Step> {
        let active = self.active.as_mut().ok_or(TriageError::NotReviewing)?;

        if active.position + 1 >= active.photos.len() {
            return Ok(self.complete());
        }
        active.position += 1;
        self.advance_until_visible(true)
    }

    /// Step back one photo. Never skips, whatever its rating.
    pub fn previous(&mut self) -> Result<Step> {
        let active = self.active.as_mut().ok_or(TriageError::NotReviewing)?;

        if active.position == 0 {
            return Err(TriageError::NoPreviousPhoto);
        }
        active.position -= 1;
        self.advance_until_visible(false)
    }

    /// Move the displayed photo to the rejected collection and show the photo
    /// that takes its slot. If the move fails nothing changes.
    pub fn reject(&mut self) -> Result<Step> {
        let (folder, filename) = {
            let active = self.active.as_ref().ok_or(TriageError::NotReviewing)?;
            let filename = active
                .photos
                .get(active.position)
                .ok_or(TriageError::NotReviewing)?;
            (active.folder.clone(), filename.clone())
        };

        self.backend.move_to_rejected(&folder, &filename)?;

        let active = self.active.as_mut().ok_or(TriageError::NotReviewing)?;
        active.photos.remove(active.position);

        if active.photos.is_empty() {
            return Ok(self.complete());
        }
        if active.position >= active.photos.len() {
            active.position = active.photos.len() - 1;
        }
        self.advance_until_visible(false)
    }

    /// Leave the folder and forget the checkpoint.
    pub fn exit(&mut self) -> Result<()> {
        let active = self.active.take().ok_or(TriageError::NotReviewing)?;
        self.discard_checkpoint();
        log::info!("Left review of '{}'", active.folder);
        Ok(())
    }
}
