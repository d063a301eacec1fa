//! Type-safe wrappers for the identifiers the uploader passes around

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PHOTO_KEY: AtomicU64 = AtomicU64::new(1);

/// Local identity of a pending photo
///
/// Keys are handed out from a process-wide counter, so two photos never share
/// a key even when they wrap the same file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhotoKey(u64);

impl PhotoKey {
    /// Allocates a fresh key
    pub fn next() -> Self {
        Self(NEXT_PHOTO_KEY.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl Display for PhotoKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Remote album identifier
///
/// The remote API uses 64-bit decimal ids. `"-1"` is reserved for the
/// default album, in which case no album parameter is sent at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumId(String);

impl AlbumId {
    /// Sentinel value meaning "no album selected"
    pub const DEFAULT: &'static str = "-1";

    /// Creates an album id from a string without validation
    pub fn new(aid: String) -> Self {
        Self(aid)
    }

    /// The default album sentinel
    pub fn default_album() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    /// Whether this id is the default album sentinel
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }

    /// Returns the album id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Album id as used by the album web pages
    ///
    /// The page id is the least significant 32 bits of the API id; the user
    /// id occupies the upper 32 bits.
    pub fn url_album_id(&self) -> Option<String> {
        if self.is_default() {
            return None;
        }
        self.0
            .parse::<u64>()
            .ok()
            .map(|id| (id & 0xffff_ffff).to_string())
    }

    /// Page for reviewing the album after an upload
    pub fn edit_album_url(&self) -> String {
        match self.url_album_id() {
            Some(aid) => format!("http://www.facebook.com/editalbum.php?aid={}&org=1", aid),
            None => "http://www.facebook.com/editalbum.php?org=1".to_string(),
        }
    }
}

impl Default for AlbumId {
    fn default() -> Self {
        Self::default_album()
    }
}

impl FromStr for AlbumId {
    type Err = AlbumIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == Self::DEFAULT {
            return Ok(Self::default_album());
        }
        if s.is_empty() {
            return Err(AlbumIdError::Empty);
        }
        if !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(AlbumIdError::InvalidFormat(s.to_string()));
        }
        Ok(AlbumId(s.to_string()))
    }
}

impl Display for AlbumId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AlbumId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<AlbumId> for String {
    fn from(aid: AlbumId) -> Self {
        aid.0
    }
}

/// Identifier the remote API assigns to an uploaded photo
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RemotePhotoId(String);

impl RemotePhotoId {
    pub fn new(pid: String) -> Self {
        Self(pid)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemotePhotoId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remote user identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(uid: String) -> Self {
        Self(uid)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// Error types

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumIdError {
    Empty,
    InvalidFormat(String),
}

impl fmt::Display for AlbumIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AlbumIdError::Empty => write!(f, "Album id is empty"),
            AlbumIdError::InvalidFormat(s) => write!(f, "Invalid album id: {}", s),
        }
    }
}

impl std::error::Error for AlbumIdError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_keys_are_unique() {
        let a = PhotoKey::next();
        let b = PhotoKey::next();
        assert_ne!(a, b);
        assert!(b.value() > a.value());
    }

    #[test]
    fn test_album_id_from_str() {
        let aid = AlbumId::from_str("123456").unwrap();
        assert_eq!(aid.as_str(), "123456");
        assert!(!aid.is_default());

        assert!(AlbumId::from_str("-1").unwrap().is_default());
        assert_eq!(AlbumId::from_str(""), Err(AlbumIdError::Empty));
        assert!(AlbumId::from_str("12ab").is_err());
    }

    #[test]
    fn test_url_album_id_keeps_low_bits() {
        // uid 1234 in the upper half, album 5 in the lower half
        let api_id = (1234u64 << 32) | 5;
        let aid = AlbumId::new(api_id.to_string());
        assert_eq!(aid.url_album_id(), Some("5".to_string()));
        assert_eq!(
            aid.edit_album_url(),
            "http://www.facebook.com/editalbum.php?aid=5&org=1"
        );

        assert_eq!(AlbumId::default_album().url_album_id(), None);
        assert_eq!(
            AlbumId::default_album().edit_album_url(),
            "http://www.facebook.com/editalbum.php?org=1"
        );
    }
}
