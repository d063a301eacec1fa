//! Batch uploads
//!
//! This module runs the pending photos through resize, upload and tagging,
//! reporting size-weighted progress and honouring cancellation between photos.

pub mod pipeline;
pub mod progress;
pub mod tagging;
pub mod types;

pub use pipeline::{CancelToken, UploadPipeline};
pub use progress::ProgressTracker;
pub use tagging::apply_tags;
pub use types::{
    PipelineState, RunSummary, UploadCallbacks, UploadProgress, UploadedPhoto,
};
