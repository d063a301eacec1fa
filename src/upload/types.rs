use crate::error::UploaderError;
use crate::types::{AlbumId, PhotoKey, RemotePhotoId};
use serde::Serialize;
use std::sync::Arc;

/// Lifecycle of an upload pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl PipelineState {
    /// Whether a run ended in this state
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            PipelineState::Completed | PipelineState::Cancelled | PipelineState::Failed
        )
    }
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PipelineState::Idle => "idle",
            PipelineState::Running => "running",
            PipelineState::Completed => "completed",
            PipelineState::Cancelled => "cancelled",
            PipelineState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Progress of a whole run, weighted by photo size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadProgress {
    /// 0.0 to 100.0, never decreasing within a run
    pub percentage: f64,
    /// Bytes of finished photos plus the estimated share of the current one
    pub bytes_uploaded: u64,
    pub total_bytes: u64,
    /// 1-based position of the photo being uploaded
    pub current_photo: usize,
    pub total_photos: usize,
}

pub type ProgressCallback = Arc<dyn Fn(UploadProgress) + Send + Sync>;
pub type DoneCallback = Arc<dyn Fn() + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&str, &UploaderError) + Send + Sync>;

/// Callbacks a run reports through
///
/// Exactly one of `on_complete`, `on_cancelled` or `on_error` is called per
/// run. None of them is called when `start` is rejected up front.
#[derive(Clone, Default)]
pub struct UploadCallbacks {
    pub on_progress: Option<ProgressCallback>,
    pub on_complete: Option<DoneCallback>,
    pub on_cancelled: Option<DoneCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl std::fmt::Debug for UploadCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadCallbacks")
            .field("on_progress", &self.on_progress.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .field("on_cancelled", &self.on_cancelled.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl UploadCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(UploadProgress) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_complete = Some(Arc::new(callback));
        self
    }

    pub fn on_cancelled<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_cancelled = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &UploaderError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub(crate) fn progress(&self, progress: UploadProgress) {
        if let Some(ref callback) = self.on_progress {
            callback(progress);
        }
    }

    pub(crate) fn complete(&self) {
        if let Some(ref callback) = self.on_complete {
            callback();
        }
    }

    pub(crate) fn cancelled(&self) {
        if let Some(ref callback) = self.on_cancelled {
            callback();
        }
    }

    pub(crate) fn error(&self, message: &str, error: &UploaderError) {
        if let Some(ref callback) = self.on_error {
            callback(message, error);
        }
    }
}

/// A photo the run finished with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedPhoto {
    pub key: PhotoKey,
    pub pid: RemotePhotoId,
    pub name: String,
}

/// Outcome of a run that did not fail
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// `Completed` or `Cancelled`
    pub state: PipelineState,
    pub album: AlbumId,
    pub uploaded: Vec<UploadedPhoto>,
    pub bytes_uploaded: u64,
    pub total_bytes: u64,
    pub duration_ms: u64,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.state == PipelineState::Completed
    }
}
