//! A pending photo: a local file plus the caption and tags to send with it

use crate::error::{Result, UploaderError};
use crate::photo::mime::mime_type_for;
use crate::photo::tag::Tag;
use crate::types::PhotoKey;
use bytesize::ByteSize;
use reqwest::Url;
use std::path::{Path, PathBuf};

/// A photo waiting to be uploaded
///
/// The file path is fixed at construction. Size, name and URL are derived from
/// the file every time they are asked for, so they follow the file on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    key: PhotoKey,
    path: PathBuf,
    caption: String,
    tags: Vec<Tag>,
}

impl Photo {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        log::debug!("Creating new photo {}", path.display());
        Self {
            key: PhotoKey::next(),
            path,
            caption: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn key(&self) -> PhotoKey {
        self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) {
        self.caption = caption.into();
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn add_tag(&mut self, tag: Tag) {
        self.tags.push(tag);
    }

    /// Remove the tag at `index`, keeping the order of the others
    pub fn remove_tag(&mut self, index: usize) -> Option<Tag> {
        if index < self.tags.len() {
            Some(self.tags.remove(index))
        } else {
            None
        }
    }

    /// Current size of the file on disk
    pub fn size_in_bytes(&self) -> Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    /// Current size of the file on disk, without blocking the runtime
    pub async fn file_size(&self) -> Result<u64> {
        Ok(tokio::fs::metadata(&self.path).await?.len())
    }

    /// The file name without its directory
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }

    /// Display name cut to `max` characters, with `...` appended when cut
    pub fn short_name(&self, max: usize) -> String {
        let name = self.display_name();
        if name.chars().count() <= max {
            return name;
        }
        let mut short: String = name.chars().take(max).collect();
        short.push_str("...");
        short
    }

    /// Human readable file size, e.g. for an edit panel
    pub fn size_label(&self) -> Result<String> {
        Ok(ByteSize::b(self.size_in_bytes()?).to_string())
    }

    /// `file://` URL of the photo, for previews
    pub fn content_url(&self) -> Result<Url> {
        let absolute = if self.path.is_absolute() {
            self.path.clone()
        } else {
            std::env::current_dir()?.join(&self.path)
        };
        Url::from_file_path(&absolute).map_err(|_| {
            UploaderError::invalid_parameter(
                "path",
                format!("Cannot build a URL for {}", absolute.display()),
            )
        })
    }

    /// MIME type judged from the file extension
    pub fn mime_type(&self) -> Option<&'static str> {
        mime_type_for(&self.path)
    }

    /// Read the whole file
    pub async fn read_bytes(&self) -> Result<bytes::Bytes> {
        let data = tokio::fs::read(&self.path).await?;
        Ok(bytes::Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_derived_facts_follow_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("holiday.jpg");
        std::fs::write(&path, vec![0u8; 10]).unwrap();

        let photo = Photo::new(&path);
        assert_eq!(photo.size_in_bytes().unwrap(), 10);
        assert_eq!(photo.display_name(), "holiday.jpg");
        assert_eq!(photo.mime_type(), Some("image/jpeg"));

        let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&[1u8; 5]).unwrap();
        drop(file);
        assert_eq!(photo.size_in_bytes().unwrap(), 15);

        let url = photo.content_url().unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.path().ends_with("/holiday.jpg"));
    }

    #[test]
    fn test_read_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let photo = Photo::new(&path);
        let data = tokio_test::block_on(photo.read_bytes()).unwrap();
        assert_eq!(data.as_ref(), b"GIF89a");
        assert_eq!(tokio_test::block_on(photo.file_size()).unwrap(), 6);
        assert_eq!(photo.size_label().unwrap(), "6 B");
    }

    #[test]
    fn test_missing_file_has_no_size() {
        let photo = Photo::new("/definitely/not/here.png");
        assert!(photo.size_in_bytes().is_err());
        assert_eq!(photo.display_name(), "here.png");
    }

    #[test]
    fn test_caption_and_tags() {
        let mut photo = Photo::new("a.png");
        assert_eq!(photo.caption(), "");
        photo.set_caption("At the beach");
        assert_eq!(photo.caption(), "At the beach");

        photo.add_tag(Tag::text("one", 1, 1));
        photo.add_tag(Tag::text("two", 2, 2));
        photo.add_tag(Tag::text("three", 3, 3));
        let removed = photo.remove_tag(1).unwrap();
        assert_eq!(removed.label(), "two");
        let labels: Vec<&str> = photo.tags().iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["one", "three"]);
        assert!(photo.remove_tag(5).is_none());
    }

    #[test]
    fn test_short_name() {
        let photo = Photo::new("/photos/a_rather_long_file_name_from_a_camera_0001.jpg");
        assert_eq!(photo.short_name(10), "a_rather_l...");
        let photo = Photo::new("short.jpg");
        assert_eq!(photo.short_name(30), "short.jpg");
    }

    #[test]
    fn test_clones_share_identity() {
        let photo = Photo::new("x.png");
        let other = Photo::new("x.png");
        assert_eq!(photo.clone().key(), photo.key());
        assert_ne!(photo.key(), other.key());
    }
}
