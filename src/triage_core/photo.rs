use crate::triage_core::error::{Result, TriageError};
use std::fmt;
use std::path::Path;

/// The photo a review session is currently showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedPhoto {
    pub folder: String,
    pub filename: String,
    /// 0-based index into the folder's photo list.
    pub position: usize,
    pub total: usize,
    pub rating: Option<u8>,
}

impl DisplayedPhoto {
    /// 1-based position shown to the user.
    pub fn ordinal(&self) -> usize {
        self.position + 1
    }

    pub fn stars(&self) -> String {
        stars(self.rating)
    }
}

/// Star rendering of a rating, e.g. "★★★☆☆", or "No rating".
pub fn stars(rating: Option<u8>) -> String {
    match rating {
        Some(rating) => {
            let filled = usize::from(rating.min(5));
            format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
        }
        None => "No rating".to_string(),
    }
}

impl fmt::Display for DisplayedPhoto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  [{} / {}]  {}",
            self.filename,
            self.ordinal(),
            self.total,
            self.stars()
        )
    }
}

/// Raw bytes of a photo plus the content type derived from its extension.
#[derive(Debug, Clone)]
pub struct PhotoData {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

/// Content type for a photo file, by extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "heic" | "heif" => "image/heic",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Ensure a folder or file name is a single path component, so it cannot
/// escape the collection root.
pub fn validate_name(name: &str) -> Result<&str> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);

    if invalid {
        return Err(TriageError::InvalidName(name.to_string()));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn displayed(position: usize, total: usize, rating: Option<u8>) -> DisplayedPhoto {
        DisplayedPhoto {
            folder: "2024".to_string(),
            filename: "b.jpg".to_string(),
            position,
            total,
            rating,
        }
    }

    #[test]
    fn test_ordinal_is_one_based() {
        assert_eq!(displayed(0, 3, None).ordinal(), 1);
        assert_eq!(displayed(2, 3, None).ordinal(), 3);
    }

    #[test]
    fn test_stars() {
        assert_eq!(displayed(0, 1, Some(3)).stars(), "★★★☆☆");
        assert_eq!(displayed(0, 1, Some(0)).stars(), "☆☆☆☆☆");
        assert_eq!(displayed(0, 1, None).stars(), "No rating");
        assert_eq!(stars(Some(4)), "★★★★☆");
        assert_eq!(stars(Some(9)), "★★★★★");
    }

    #[test]
    fn test_display_line() {
        let line = displayed(1, 3, Some(2)).to_string();
        assert_eq!(line, "b.jpg  [2 / 3]  ★★☆☆☆");
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(content_type_for(Path::new("a")), "application/octet-stream");
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("2024").is_ok());
        assert!(validate_name("IMG_0001.jpg").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("..").is_err());
        assert!(validate_name("../secret").is_err());
        assert!(validate_name("a\\b").is_err());
    }
}
