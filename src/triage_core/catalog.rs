use crate::triage_core::error::{Result, TriageError};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use walkdir::WalkDir;

/// Lists the folders of a photo collection and the photos inside them.
pub trait PhotoCatalog {
    /// Folder names, ascending, with excluded names removed.
    fn list_folders(&self) -> Result<Vec<String>>;

    /// Photo filenames in a folder, oldest modification time first.
    fn list_photos(&self, folder: &str) -> Result<Vec<String>>;
}

/// Check whether a path has one of the recognized image extensions.
/// `extensions` are expected lowercase, without a leading dot.
pub fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_lowercase();
            extensions.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Walk the immediate children of `dir`, turning a failure to read `dir`
/// itself into `CatalogUnavailable`. Unreadable children are skipped.
fn read_children(dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
    if !dir.is_dir() {
        return Err(TriageError::CatalogUnavailable {
            path: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "not a readable directory"),
        });
    }

    let mut children = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        match entry {
            Ok(entry) => children.push(entry),
            Err(e) if e.depth() == 0 => {
                return Err(TriageError::CatalogUnavailable {
                    path: dir.to_path_buf(),
                    source: e.into(),
                });
            }
            Err(e) => log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e),
        }
    }
    Ok(children)
}

/// List the folders directly under `root`, sorted by name (case-sensitive),
/// leaving out any name in `excluded`.
pub fn list_folders(root: &Path, excluded: &[String]) -> Result<Vec<String>> {
    let mut folders: Vec<String> = read_children(root)?
        .into_iter()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !excluded.contains(name))
        .collect();

    folders.sort();
    log::debug!("Found {} folders under {}", folders.len(), root.display());
    Ok(folders)
}

/// Modification time of a file, or the epoch when it cannot be read so the
/// photo sorts first instead of disappearing.
fn modified_or_epoch(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or_else(|e| {
            log::warn!(
                "Failed to get modified time for {}: {}. Sorting it first.",
                path.display(),
                e
            );
            UNIX_EPOCH
        })
}

/// List the photos in `dir` with a recognized extension, ordered by
/// ascending modification time. Ties keep directory order.
pub fn list_photos(dir: &Path, extensions: &[String]) -> Result<Vec<String>> {
    // The listing's own file type; the only stat is in modified_or_epoch.
    let candidates: Vec<(String, PathBuf)> = read_children(dir)?
        .into_iter()
        .filter(|entry| !entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .filter(|path| has_image_extension(path, extensions))
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            Some((name, path))
        })
        .collect();

    // Stat in parallel; collect keeps the original order.
    let mut timed: Vec<(String, SystemTime)> = candidates
        .into_par_iter()
        .map(|(name, path)| {
            let modified = modified_or_epoch(&path);
            (name, modified)
        })
        .collect();

    timed.sort_by_key(|(_, modified)| *modified);

    log::debug!("Found {} photos in {}", timed.len(), dir.display());
    Ok(timed.into_iter().map(|(name, _)| name).collect())
}
