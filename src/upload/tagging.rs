use crate::api::response::scalar_text;
use crate::api::{RemoteApi, ADD_TAG_METHOD};
use crate::error::{Result, UploaderError};
use crate::multipart::FormFields;
use crate::photo::{tags_to_json, Tag};
use crate::types::RemotePhotoId;
use serde_json::Value;

/// Apply all of a photo's tags in one call
///
/// Does nothing when `tags` is empty. Every failure, including a response
/// other than `true`, is reported as `TagFailure`.
pub async fn apply_tags(api: &dyn RemoteApi, pid: &RemotePhotoId, tags: &[Tag]) -> Result<()> {
    if tags.is_empty() {
        return Ok(());
    }

    let json = tags_to_json(tags).map_err(|e| UploaderError::tag_failure(e.to_string()))?;
    let params = FormFields::new()
        .with("pid", pid.as_str())
        .with("uid", api.user_id().as_str())
        .with("tags", json);

    log::debug!("Tagging photo {} with {} tag(s)", pid, tags.len());
    let response = api
        .call(ADD_TAG_METHOD, params)
        .await
        .map_err(|e| UploaderError::tag_failure(e.to_string()))?;

    match response {
        Value::Bool(true) => Ok(()),
        ref other if scalar_text(other) == "1" => Ok(()),
        other => Err(UploaderError::tag_failure(format!(
            "Tagging of photo {} was not confirmed: {}",
            pid, other
        ))),
    }
}
