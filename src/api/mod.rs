//! Remote photo API
//!
//! [`RemoteApi`] is the seam between the upload pipeline and the network.
//! [`RestClient`] implements it over HTTP; tests substitute their own.

pub mod albums;
pub mod call_id;
pub mod client;
pub mod response;
pub mod signature;

pub use albums::{authorize_url, fetch_albums, has_app_permission, Album, UPLOAD_PERMISSION};
pub use call_id::next_call_id;
pub use client::{ApiCredentials, RestClient};
pub use response::{parse_response, photo_id};
pub use signature::compute_signature;

use crate::error::Result;
use crate::multipart::{FormFields, FractionCallback, MultipartBody};
use crate::types::UserId;
use async_trait::async_trait;
use serde_json::Value;

pub const UPLOAD_METHOD: &str = "facebook.photos.upload";
pub const ADD_TAG_METHOD: &str = "facebook.photos.addTag";
pub const GET_ALBUMS_METHOD: &str = "facebook.photos.getAlbums";
pub const HAS_APP_PERMISSION_METHOD: &str = "facebook.users.hasAppPermission";

/// A client for the remote photo API
///
/// Failures are reported as `TransportFailure` when no usable response came
/// back, `ServerError` when the API answered with an error code and
/// `MalformedResponse` when the body could not be decoded.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// The user the client is acting for
    fn user_id(&self) -> UserId;

    /// Append the session, call id and signature fields to `fields`
    fn sign(&self, fields: FormFields) -> FormFields;

    /// Call `method` with `params`, signing the request
    async fn call(&self, method: &str, params: FormFields) -> Result<Value>;

    /// Send an already signed multipart body
    ///
    /// `on_progress` receives the fraction of the body sent so far.
    async fn submit_multipart(
        &self,
        body: MultipartBody,
        on_progress: FractionCallback,
    ) -> Result<Value>;
}
