//! Album listing and the upload permission check

use crate::api::response::scalar_text;
use crate::api::{RemoteApi, GET_ALBUMS_METHOD, HAS_APP_PERMISSION_METHOD};
use crate::error::{Result, UploaderError};
use crate::multipart::FormFields;
use crate::types::AlbumId;
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Extended permission needed to upload photos
pub const UPLOAD_PERMISSION: &str = "photo_upload";

const AUTHORIZE_URL: &str = "http://www.facebook.com/authorize.php";

/// A remote album the user can upload into
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Album {
    #[serde(deserialize_with = "album_id_from_text_or_number")]
    pub aid: AlbumId,
    pub name: String,
}

/// Album ids arrive as JSON strings or as bare numbers
fn album_id_from_text_or_number<'de, D>(deserializer: D) -> std::result::Result<AlbumId, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(serde_json::Number),
    }

    let aid = match RawId::deserialize(deserializer)? {
        RawId::Text(aid) => aid,
        RawId::Number(aid) => aid.to_string(),
    };
    Ok(AlbumId::new(aid))
}

/// List the current user's albums
pub async fn fetch_albums(api: &dyn RemoteApi) -> Result<Vec<Album>> {
    let params = FormFields::new().with("uid", api.user_id().as_str());
    let response = api.call(GET_ALBUMS_METHOD, params).await?;

    let entries = match &response {
        Value::Array(entries) => entries,
        // No albums yet
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) if map.is_empty() => return Ok(Vec::new()),
        _ => {
            return Err(UploaderError::malformed_response(
                "Album list is not an array",
                response.to_string(),
            ))
        }
    };

    let albums = entries
        .iter()
        .map(|entry| {
            Album::deserialize(entry).map_err(|e| {
                UploaderError::malformed_response(
                    format!("Invalid album entry: {}", e),
                    entry.to_string(),
                )
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::debug!("Fetched {} album(s)", albums.len());
    Ok(albums)
}

/// Whether the user granted the application `permission`
pub async fn has_app_permission(api: &dyn RemoteApi, permission: &str) -> Result<bool> {
    let params = FormFields::new().with("ext_perm", permission);
    let response = api.call(HAS_APP_PERMISSION_METHOD, params).await?;
    Ok(scalar_text(&response) == "1")
}

/// Page where the user can grant `permission` to the application
pub fn authorize_url(api_key: &str, permission: &str) -> Result<Url> {
    Url::parse_with_params(
        AUTHORIZE_URL,
        &[("api_key", api_key), ("v", "1.0"), ("ext_perm", permission)],
    )
    .map_err(|e| UploaderError::invalid_parameter("api_key", e.to_string()))
}
