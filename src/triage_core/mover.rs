use crate::triage_core::error::{Result, TriageError};
use crate::triage_core::photo::validate_name;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Relocates photos out of the active collection.
pub trait PhotoMover {
    /// Move `folder/filename` into the rejected collection, returning its new path.
    fn move_to_rejected(&self, folder: &str, filename: &str) -> Result<PathBuf>;
}

fn move_failed(path: &Path, source: io::Error) -> TriageError {
    TriageError::MoveFailed {
        path: path.to_path_buf(),
        source,
    }
}

/// Move `active_root/folder/filename` to `rejected_root/folder/filename`,
/// creating the mirrored folder on demand. Only that file moves; on failure
/// it stays where it was.
pub fn move_photo(
    active_root: &Path,
    rejected_root: &Path,
    folder: &str,
    filename: &str,
) -> Result<PathBuf> {
    let folder = validate_name(folder)?;
    let filename = validate_name(filename)?;

    let src = active_root.join(folder).join(filename);
    let dest_dir = rejected_root.join(folder);
    let dest = dest_dir.join(filename);

    if !src.is_file() {
        return Err(move_failed(
            &src,
            io::Error::new(io::ErrorKind::NotFound, "photo does not exist"),
        ));
    }

    fs::create_dir_all(&dest_dir).map_err(|e| move_failed(&src, e))?;

    // rename() silently replaces on Unix; never clobber an earlier reject.
    if dest.exists() {
        return Err(move_failed(
            &src,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} already exists", dest.display()),
            ),
        ));
    }

    fs::rename(&src, &dest).map_err(|e| move_failed(&src, e))?;
    log::info!("Moved {} -> {}", src.display(), dest.display());

    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;

    struct Roots {
        _temp: TempDir,
        active: PathBuf,
        rejected: PathBuf,
    }

    fn roots() -> Roots {
        let temp = TempDir::new().unwrap();
        let active = temp.path().join("photos");
        let rejected = temp.path().join("photo-low");
        fs::create_dir_all(active.join("2024")).unwrap();
        Roots {
            _temp: temp,
            active,
            rejected,
        }
    }

    #[test]
    fn test_move_creates_destination_folder() {
        let r = roots();
        fs::write(r.active.join("2024/a.jpg"), b"photo").unwrap();

        let dest = move_photo(&r.active, &r.rejected, "2024", "a.jpg").unwrap();

        assert_eq!(dest, r.rejected.join("2024/a.jpg"));
        assert!(dest.is_file());
        assert!(!r.active.join("2024/a.jpg").exists());
    }

    #[test]
    fn test_move_leaves_files_sharing_the_stem() {
        let r = roots();
        fs::write(r.active.join("2024/a.jpg"), b"jpeg").unwrap();
        fs::write(r.active.join("2024/a.png"), b"png").unwrap();
        fs::write(r.active.join("2024/a.xmp"), b"xmp").unwrap();

        move_photo(&r.active, &r.rejected, "2024", "a.jpg").unwrap();

        assert!(r.rejected.join("2024/a.jpg").is_file());
        assert!(r.active.join("2024/a.png").is_file());
        assert!(r.active.join("2024/a.xmp").is_file());
        assert!(!r.rejected.join("2024/a.xmp").exists());
    }

    #[test]
    fn test_move_missing_source_fails() {
        let r = roots();
        let err = move_photo(&r.active, &r.rejected, "2024", "ghost.jpg").unwrap_err();
        assert!(matches!(err, TriageError::MoveFailed { .. }));
    }

    #[test]
    fn test_move_refuses_to_overwrite() {
        let r = roots();
        fs::write(r.active.join("2024/a.jpg"), b"new").unwrap();
        fs::create_dir_all(r.rejected.join("2024")).unwrap();
        fs::write(r.rejected.join("2024/a.jpg"), b"old").unwrap();

        let err = move_photo(&r.active, &r.rejected, "2024", "a.jpg").unwrap_err();

        assert!(matches!(err, TriageError::MoveFailed { .. }));
        assert_eq!(fs::read(r.active.join("2024/a.jpg")).unwrap(), b"new");
        assert_eq!(fs::read(r.rejected.join("2024/a.jpg")).unwrap(), b"old");
    }

    #[test]
    fn test_move_rejects_path_traversal() {
        let r = roots();
        let err = move_photo(&r.active, &r.rejected, "..", "a.jpg").unwrap_err();
        assert!(matches!(err, TriageError::InvalidName(_)));
    }
}
