use exif::{Context, Exif, In, Tag};
use std::io::Cursor;

/// Number of leading bytes read from a photo to find its rating.
/// EXIF and XMP blocks live at the start of the file.
pub const RATING_HEADER_BYTES: usize = 64 * 1024;

/// Windows "Rating" tag (0-5 stars) in the primary IFD.
const TAG_RATING: Tag = Tag(Context::Tiff, 0x4746);

/// Windows "RatingPercent" tag (0-100) in the primary IFD.
const TAG_RATING_PERCENT: Tag = Tag(Context::Tiff, 0x4749);

/// XMP properties carrying a star rating and a percentage rating.
const XMP_RATING: &str = "xmp:Rating";
const XMP_RATING_PERCENT: &str = "MicrosoftPhoto:Rating";

/// Longest XMP value we are willing to treat as a number.
const MAX_XMP_VALUE_LEN: usize = 16;

/// Anything that can tell the rating of a photo in a folder.
/// Missing or unreadable metadata is `None`, never an error.
pub trait RatingSource {
    fn rating(&self, folder: &str, filename: &str) -> Option<u8>;
}

/// Rating values found in the metadata, before reconciliation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct RatingTags {
    stars: Option<i64>,
    percent: Option<i64>,
}

impl RatingTags {
    fn from_exif(exif: &Exif) -> Self {
        let read = |tag: Tag| {
            exif.get_field(tag, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0))
                .map(i64::from)
        };

        RatingTags {
            stars: read(TAG_RATING),
            percent: read(TAG_RATING_PERCENT),
        }
    }

    /// Fill in whatever EXIF did not provide from an embedded XMP packet.
    fn fill_from_xmp(&mut self, bytes: &[u8]) {
        if self.stars.is_none() {
            self.stars = xmp_value(bytes, XMP_RATING).and_then(parse_number);
        }
        if self.percent.is_none() {
            self.percent = xmp_value(bytes, XMP_RATING_PERCENT).and_then(parse_number);
        }
    }

    /// A direct star rating always wins over a percentage.
    fn resolve(self) -> Option<u8> {
        if let Some(stars) = self.stars {
            return u8::try_from(stars).ok().filter(|s| *s <= 5);
        }
        self.percent
            .filter(|p| *p >= 0)
            .map(|p| stars_from_percent(p.min(100) as u32))
    }
}

/// Convert a 0-100 percentage rating to 0-5 stars, rounding halves up.
pub fn stars_from_percent(percent: u32) -> u8 {
    ((percent.min(100) * 5 + 50) / 100) as u8
}

/// Extract a 0-5 star rating from the leading bytes of an image file.
///
/// Truncated input, files without metadata and unsupported formats all
/// yield `None`.
pub fn extract_rating(bytes: &[u8]) -> Option<u8> {
    let mut tags = match exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => RatingTags::from_exif(&exif),
        Err(e) => {
            log::trace!("No readable EXIF block: {}", e);
            RatingTags::default()
        }
    };
    tags.fill_from_xmp(bytes);
    tags.resolve()
}

/// Find the value of an XMP property written either as an attribute
/// (`xmp:Rating="3"`) or as an element (`<xmp:Rating>3</xmp:Rating>`).
fn xmp_value<'a>(bytes: &'a [u8], key: &str) -> Option<&'a str> {
    let key = key.as_bytes();
    let start = bytes.windows(key.len()).position(|w| w == key)? + key.len();
    let rest = &bytes[start..];

    let value = match rest.first()? {
        b'=' => {
            let quote = *rest.get(1)?;
            if quote != b'"' && quote != b'\'' {
                return None;
            }
            let body = &rest[2..];
            let end = body.iter().position(|b| *b == quote)?;
            &body[..end]
        }
        b'>' => {
            let body = &rest[1..];
            let end = body.iter().position(|b| *b == b'<')?;
            &body[..end]
        }
        _ => return None,
    };

    if value.len() > MAX_XMP_VALUE_LEN {
        return None;
    }
    std::str::from_utf8(value).ok()
}

fn parse_number(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}
