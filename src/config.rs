//! Configuration structures for the uploader

use crate::error::{Result, UploaderError};
use crate::types::AlbumId;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest width sent to the remote API
pub const DEFAULT_MAX_WIDTH: u32 = 604;
/// Largest height sent to the remote API
pub const DEFAULT_MAX_HEIGHT: u32 = 604;
/// Size of the body chunks handed to the HTTP client
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

pub const DEFAULT_ENDPOINT: &str = "http://api.facebook.com/restserver.php";

/// Log level for the uploader
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// What to do once a batch has been uploaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostUploadAction {
    #[default]
    AskUser,
    OpenAlbum,
    StayHere,
}

impl PostUploadAction {
    /// Page to open for `album`, if this action opens one
    ///
    /// `AskUser` has to be resolved by the caller first and yields `None`.
    pub fn target_url(&self, album: &AlbumId) -> Option<String> {
        match self {
            PostUploadAction::OpenAlbum => Some(album.edit_album_url()),
            PostUploadAction::AskUser | PostUploadAction::StayHere => None,
        }
    }
}

/// Configuration for the uploader
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UploaderConfig {
    /// REST endpoint every call is posted to
    pub endpoint: String,

    /// Application key
    pub api_key: String,

    /// Application secret used to sign requests
    pub secret: String,

    /// Session key of the logged-in user
    pub session_key: String,

    /// Logged-in user id
    pub uid: String,

    /// API version sent with every call (default: "1.0")
    pub api_version: String,

    /// Resize bound, in pixels (default: 604)
    pub max_width: u32,

    /// Resize bound, in pixels (default: 604)
    pub max_height: u32,

    /// Bytes per streamed body chunk; sets progress granularity (default: 64 KiB)
    pub chunk_size: usize,

    /// Per-request timeout in seconds (default: none)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Log level (default: info)
    pub log_level: LogLevel,

    /// What to do after a successful batch (default: ask-user)
    pub post_upload_action: PostUploadAction,

    /// Album picked during the previous session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_album_id: Option<AlbumId>,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: String::new(),
            secret: String::new(),
            session_key: String::new(),
            uid: String::new(),
            api_version: "1.0".to_string(),
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            chunk_size: DEFAULT_CHUNK_SIZE,
            timeout: None,
            log_level: LogLevel::Info,
            post_upload_action: PostUploadAction::AskUser,
            last_album_id: None,
        }
    }
}

impl UploaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the credentials used to sign calls
    pub fn credentials<S: Into<String>>(mut self, api_key: S, secret: S, session_key: S) -> Self {
        self.api_key = api_key.into();
        self.secret = secret.into();
        self.session_key = session_key.into();
        self
    }

    /// Set the logged-in user
    pub fn uid<S: Into<String>>(mut self, uid: S) -> Self {
        self.uid = uid.into();
        self
    }

    /// Set the REST endpoint
    pub fn endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the resize bound
    pub fn max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    pub fn timeout(mut self, seconds: u64) -> Self {
        self.timeout = Some(seconds);
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn post_upload_action(mut self, action: PostUploadAction) -> Self {
        self.post_upload_action = action;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(UploaderError::invalid_parameter(
                "endpoint",
                "Endpoint cannot be empty",
            ));
        }

        if self.chunk_size == 0 {
            return Err(UploaderError::invalid_parameter(
                "chunk_size",
                "Chunk size must be greater than 0",
            ));
        }

        if self.max_width == 0 || self.max_height == 0 {
            return Err(UploaderError::invalid_parameter(
                "max_dimensions",
                "Resize bound must be greater than 0",
            ));
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err(UploaderError::invalid_parameter(
                    "timeout",
                    "Timeout must be greater than 0",
                ));
            }
        }

        Ok(())
    }

    /// Convert the configuration to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(UploaderError::from)
    }

    /// Create a configuration from a JSON string
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut value: serde_json::Value = serde_json::from_str(json)?;
        let mut merged = serde_json::to_value(Self::default())?;
        if let (Some(base), Some(overrides)) = (merged.as_object_mut(), value.as_object_mut()) {
            for (key, v) in std::mem::take(overrides) {
                base.insert(key, v);
            }
        } else {
            return Err(UploaderError::config_error(
                "Configuration must be a JSON object",
            ));
        }
        serde_json::from_value(merged).map_err(UploaderError::from)
    }

    /// Load and validate a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            UploaderError::config_error(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_json(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration back, e.g. after remembering an album choice
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
