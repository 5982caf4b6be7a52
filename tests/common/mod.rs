use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use std::fs::File;
use std::time::{Duration, UNIX_EPOCH};

/// EXIF tag holding a 0-5 star rating.
pub const TAG_RATING: u16 = 0x4746;

/// EXIF tag holding a 0-100 percentage rating.
pub const TAG_RATING_PERCENT: u16 = 0x4749;

/// A temporary photo collection with an active root, a rejected root and a
/// checkpoint file, all inside one temp dir.
pub struct Collection {
    pub temp: TempDir,
}

impl Collection {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        temp.child("photos").create_dir_all().unwrap();
        temp.child("config.toml").write_str("").unwrap();
        Collection { temp }
    }

    pub fn photos(&self) -> ChildPath {
        self.temp.child("photos")
    }

    pub fn rejected(&self) -> ChildPath {
        self.temp.child("photo-low")
    }

    pub fn checkpoint(&self) -> ChildPath {
        self.temp.child("session.json")
    }

    pub fn folder(&self, name: &str) -> ChildPath {
        let folder = self.photos().child(name);
        folder.create_dir_all().unwrap();
        folder
    }

    /// Write a JPEG carrying the given EXIF rating tags, with a fixed mtime.
    pub fn add_photo(&self, folder: &str, name: &str, tags: &[(u16, u16)], mtime_secs: u64) {
        let photo = self.folder(folder).child(name);
        photo.write_binary(&jpeg_with_tags(tags)).unwrap();
        File::options()
            .write(true)
            .open(photo.path())
            .unwrap()
            .set_modified(UNIX_EPOCH + Duration::from_secs(mtime_secs))
            .unwrap();
    }

    /// The phototriage binary pointed at this collection.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("phototriage").unwrap();
        cmd.arg("--config")
            .arg(self.temp.child("config.toml").path())
            .arg("--photos-root")
            .arg(self.photos().path())
            .arg("--rejected-root")
            .arg(self.rejected().path())
            .arg("--checkpoint-file")
            .arg(self.checkpoint().path());
        cmd
    }

    /// Write the config file used by `cmd`.
    pub fn write_config(&self, toml: &str) {
        self.temp.child("config.toml").write_str(toml).unwrap();
    }
}

/// Minimal JPEG with an APP1 EXIF block holding SHORT tags in IFD0.
pub fn jpeg_with_tags(tags: &[(u16, u16)]) -> Vec<u8> {
    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    tiff.extend_from_slice(&(tags.len() as u16).to_le_bytes());
    for (tag, value) in tags {
        tiff.extend_from_slice(&tag.to_le_bytes());
        tiff.extend_from_slice(&3u16.to_le_bytes());
        tiff.extend_from_slice(&1u32.to_le_bytes());
        tiff.extend_from_slice(&value.to_le_bytes());
        tiff.extend_from_slice(&[0, 0]);
    }
    tiff.extend_from_slice(&0u32.to_le_bytes());

    let mut payload = b"Exif\0\0".to_vec();
    payload.extend_from_slice(&tiff);

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
    jpeg.extend_from_slice(&payload);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}
