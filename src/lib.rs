pub mod api;
pub mod collection;
pub mod config;
pub mod error;
pub mod logging;
pub mod multipart;
pub mod photo;
pub mod resize;
pub mod types;
pub mod upload;

pub use api::{
    authorize_url, fetch_albums, has_app_permission, next_call_id, Album, ApiCredentials,
    RemoteApi, RestClient, UPLOAD_PERMISSION,
};

pub use collection::{
    CollectionChange, CollectionEvent, PhotoCollection, SharedCollection, Subscription,
};

pub use config::{LogLevel, PostUploadAction, UploaderConfig};

pub use error::{Result, UploaderError};

pub use multipart::{FormFields, MultipartBody, MultipartEncoder, ProgressStream, BOUNDARY};

pub use photo::{Photo, Tag, TagKind, TagPosition};

pub use resize::{fit_within, ImageResizer, ResizeService};

pub use types::{AlbumId, AlbumIdError, PhotoKey, RemotePhotoId, UserId};

pub use upload::{
    CancelToken, PipelineState, RunSummary, UploadCallbacks, UploadPipeline, UploadProgress,
    UploadedPhoto,
};
