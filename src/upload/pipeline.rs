//! The upload state machine
//!
//! A run snapshots the collection, then uploads its photos one at a time:
//! read, resize, encode, submit, tag. The first failure aborts the batch.
//! Cancellation is checked before each photo, so a photo already in flight
//! finishes first.

use crate::api::{photo_id, RemoteApi, UPLOAD_METHOD};
use crate::collection::{self, SharedCollection};
use crate::config::{UploaderConfig, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH};
use crate::error::{Result, UploaderError};
use crate::multipart::{FormFields, FractionCallback, MultipartEncoder};
use crate::photo::Photo;
use crate::resize::ResizeService;
use crate::types::{AlbumId, RemotePhotoId};
use crate::upload::progress::ProgressTracker;
use crate::upload::tagging::apply_tags;
use crate::upload::types::{PipelineState, RunSummary, UploadCallbacks, UploadedPhoto};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Cancellation flag for one run
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
struct RunSlot {
    state: PipelineState,
    token: Option<CancelToken>,
}

/// A failed run: what to tell the user, and why
struct RunFailure {
    message: String,
    error: UploaderError,
}

impl RunFailure {
    fn new(message: impl Into<String>, error: UploaderError) -> Self {
        Self {
            message: message.into(),
            error,
        }
    }
}

/// Returns the pipeline to a finished state when a run's future is dropped
/// before it completes
struct RunGuard<'a> {
    pipeline: &'a UploadPipeline,
    armed: bool,
}

impl<'a> RunGuard<'a> {
    fn new(pipeline: &'a UploadPipeline) -> Self {
        Self {
            pipeline,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            log::warn!("Upload run dropped before it finished");
            self.pipeline.finish(PipelineState::Cancelled);
        }
    }
}

/// Uploads the photos of a collection, one run at a time
pub struct UploadPipeline {
    collection: SharedCollection,
    api: Arc<dyn RemoteApi>,
    resizer: Arc<dyn ResizeService>,
    encoder: MultipartEncoder,
    max_width: u32,
    max_height: u32,
    slot: Mutex<RunSlot>,
    uploaded_bytes: AtomicU64,
}

impl std::fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("state", &self.state())
            .field("max_width", &self.max_width)
            .field("max_height", &self.max_height)
            .field("uploaded_bytes", &self.uploaded_bytes())
            .finish()
    }
}

impl UploadPipeline {
    pub fn new(
        collection: SharedCollection,
        api: Arc<dyn RemoteApi>,
        resizer: Arc<dyn ResizeService>,
    ) -> Self {
        Self {
            collection,
            api,
            resizer,
            encoder: MultipartEncoder::new(),
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            slot: Mutex::new(RunSlot::default()),
            uploaded_bytes: AtomicU64::new(0),
        }
    }

    /// Build a pipeline using the resize bound from `config`
    pub fn from_config(
        config: &UploaderConfig,
        collection: SharedCollection,
        api: Arc<dyn RemoteApi>,
        resizer: Arc<dyn ResizeService>,
    ) -> Self {
        Self::new(collection, api, resizer).with_max_dimensions(config.max_width, config.max_height)
    }

    pub fn with_max_dimensions(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.lock_slot().state
    }

    pub fn is_running(&self) -> bool {
        self.state() == PipelineState::Running
    }

    /// Bytes of photos fully uploaded and tagged in the current or last run
    pub fn uploaded_bytes(&self) -> u64 {
        self.uploaded_bytes.load(Ordering::SeqCst)
    }

    pub fn collection(&self) -> &SharedCollection {
        &self.collection
    }

    /// Upload every photo currently in the collection into `album`
    ///
    /// Fails with `AlreadyRunning` or `EmptyQueue`, without calling any
    /// callback, when a run cannot start. Otherwise the run reports through
    /// `callbacks`; a failed run is also returned as the error. Dropping the
    /// returned future mid-run leaves the pipeline `Cancelled`.
    pub async fn start(&self, album: AlbumId, callbacks: UploadCallbacks) -> Result<RunSummary> {
        // Never hold the run slot while locking the collection
        let queue = collection::lock(&self.collection).snapshot();
        let token = {
            let mut slot = self.lock_slot();
            if slot.state == PipelineState::Running {
                log::warn!("Upload requested while a run is active");
                return Err(UploaderError::AlreadyRunning);
            }
            if queue.is_empty() {
                return Err(UploaderError::EmptyQueue);
            }

            let token = CancelToken::new();
            slot.state = PipelineState::Running;
            slot.token = Some(token.clone());
            token
        };
        let guard = RunGuard::new(self);
        self.uploaded_bytes.store(0, Ordering::SeqCst);

        log::info!("Uploading {} photo(s) to album {}", queue.len(), album);
        let started = Instant::now();
        let result = self.run(&album, &queue, &token, &callbacks).await;
        guard.disarm();

        match result {
            Ok(mut summary) => {
                summary.duration_ms = started.elapsed().as_millis() as u64;
                self.finish(summary.state);
                if summary.state == PipelineState::Completed {
                    log::info!(
                        "Uploaded {} photo(s) in {}ms",
                        summary.uploaded.len(),
                        summary.duration_ms
                    );
                    callbacks.complete();
                    collection::lock(&self.collection).remove_all();
                } else {
                    log::warn!(
                        "Upload cancelled after {} of {} photo(s)",
                        summary.uploaded.len(),
                        queue.len()
                    );
                    callbacks.cancelled();
                }
                Ok(summary)
            }
            Err(failure) => {
                self.finish(PipelineState::Failed);
                log::error!("{}: {}", failure.message, failure.error);
                callbacks.error(&failure.message, &failure.error);
                Err(failure.error)
            }
        }
    }

    /// Ask the current run to stop before its next photo
    ///
    /// Does nothing when no run is active.
    pub fn cancel(&self) {
        let slot = self.lock_slot();
        match (&slot.state, &slot.token) {
            (PipelineState::Running, Some(token)) => {
                log::info!("Cancellation requested");
                token.cancel();
            }
            _ => log::debug!("Cancel ignored, pipeline is {}", slot.state),
        }
    }

    async fn run(
        &self,
        album: &AlbumId,
        queue: &[Photo],
        token: &CancelToken,
        callbacks: &UploadCallbacks,
    ) -> std::result::Result<RunSummary, RunFailure> {
        // An unreadable file cannot be resized either
        let mut sizes = Vec::with_capacity(queue.len());
        for photo in queue {
            let size = photo.file_size().await.map_err(|e| {
                RunFailure::new(
                    format!("Cannot read the size of {}", photo.display_name()),
                    UploaderError::resize_failure(e.to_string()),
                )
            })?;
            sizes.push(size);
        }
        let total_bytes: u64 = sizes.iter().sum();
        let tracker = Arc::new(Mutex::new(ProgressTracker::new(total_bytes, queue.len())));

        let mut summary = RunSummary {
            state: PipelineState::Running,
            album: album.clone(),
            uploaded: Vec::with_capacity(queue.len()),
            bytes_uploaded: 0,
            total_bytes,
            duration_ms: 0,
        };

        for (index, (photo, &size)) in queue.iter().zip(sizes.iter()).enumerate() {
            if token.is_cancelled() {
                summary.state = PipelineState::Cancelled;
                return Ok(summary);
            }

            let describe = |step: &str| {
                format!(
                    "Failed to {} photo {} of {} ({})",
                    step,
                    index + 1,
                    queue.len(),
                    photo.display_name()
                )
            };

            log::debug!("Uploading photo {} of {}: {}", index + 1, queue.len(), photo.display_name());
            let pid = self
                .upload_photo(album, photo, index, size, &tracker, callbacks)
                .await
                .map_err(|e| RunFailure::new(describe("upload"), e))?;

            apply_tags(self.api.as_ref(), &pid, photo.tags())
                .await
                .map_err(|e| RunFailure::new(describe("tag"), e))?;

            self.uploaded_bytes.fetch_add(size, Ordering::SeqCst);
            summary.bytes_uploaded += size;
            let progress = lock_tracker(&tracker).photo_done(index, size);
            callbacks.progress(progress);

            summary.uploaded.push(UploadedPhoto {
                key: photo.key(),
                pid,
                name: photo.display_name(),
            });
        }

        summary.state = PipelineState::Completed;
        Ok(summary)
    }

    async fn upload_photo(
        &self,
        album: &AlbumId,
        photo: &Photo,
        index: usize,
        size: u64,
        tracker: &Arc<Mutex<ProgressTracker>>,
        callbacks: &UploadCallbacks,
    ) -> Result<RemotePhotoId> {
        let image = self.resized_image(photo).await?;

        let mut fields = FormFields::new().with("method", UPLOAD_METHOD);
        if !album.is_default() {
            fields.push("aid", album.as_str());
        }
        if !photo.caption().is_empty() {
            fields.push("caption", photo.caption());
        }
        let fields = self.api.sign(fields);
        let body = self.encoder.encode(&photo.display_name(), &fields, image);

        let tracker = tracker.clone();
        let callbacks = callbacks.clone();
        let on_fraction: FractionCallback = Arc::new(move |fraction| {
            let progress = lock_tracker(&tracker).in_flight(index, size, fraction);
            callbacks.progress(progress);
        });

        let response = self.api.submit_multipart(body, on_fraction).await?;
        photo_id(&response)
    }

    async fn resized_image(&self, photo: &Photo) -> Result<bytes::Bytes> {
        let mime_type = photo.mime_type().ok_or_else(|| {
            UploaderError::resize_failure(format!(
                "Unknown image type for {}",
                photo.display_name()
            ))
        })?;
        let data = photo
            .read_bytes()
            .await
            .map_err(|e| UploaderError::resize_failure(e.to_string()))?;

        self.resizer
            .resize(data, mime_type, self.max_width, self.max_height)
            .await
            .map_err(|e| match e {
                UploaderError::ResizeFailure { .. } => e,
                other => UploaderError::resize_failure(other.to_string()),
            })
    }

    fn finish(&self, state: PipelineState) {
        let mut slot = self.lock_slot();
        slot.state = state;
        slot.token = None;
    }

    fn lock_slot(&self) -> MutexGuard<'_, RunSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn lock_tracker(tracker: &Mutex<ProgressTracker>) -> MutexGuard<'_, ProgressTracker> {
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
