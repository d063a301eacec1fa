//! HTTP implementation of the remote API

use crate::api::call_id::next_call_id;
use crate::api::response::parse_response;
use crate::api::signature::{compute_signature, SIGNATURE_FIELD};
use crate::api::RemoteApi;
use crate::config::UploaderConfig;
use crate::error::{Result, UploaderError};
use crate::multipart::{FormFields, FractionCallback, MultipartBody, ProgressStream};
use crate::types::UserId;
use async_trait::async_trait;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::Value;
use std::time::Duration;

/// Keys and session used to sign requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCredentials {
    pub api_key: String,
    pub secret: String,
    pub session_key: String,
    pub api_version: String,
}

impl ApiCredentials {
    pub fn from_config(config: &UploaderConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            secret: config.secret.clone(),
            session_key: config.session_key.clone(),
            api_version: config.api_version.clone(),
        }
    }
}

/// REST client posting form requests to a single endpoint
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: ApiCredentials,
    uid: UserId,
    chunk_size: usize,
}

impl RestClient {
    /// Build a client from a validated configuration
    pub fn new(config: &UploaderConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.timeout {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let http = builder.build()?;

        log::debug!("Created REST client for {}", config.endpoint);
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            credentials: ApiCredentials::from_config(config),
            uid: UserId::new(config.uid.clone()),
            chunk_size: config.chunk_size,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn credentials(&self) -> &ApiCredentials {
        &self.credentials
    }

    async fn read_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;
        match parse_response(&body) {
            Err(UploaderError::MalformedResponse { .. }) if !status.is_success() => Err(
                UploaderError::transport_failure(format!("HTTP status {}", status)),
            ),
            other => other,
        }
    }
}

#[async_trait]
impl RemoteApi for RestClient {
    fn user_id(&self) -> UserId {
        self.uid.clone()
    }

    fn sign(&self, mut fields: FormFields) -> FormFields {
        fields.push("session_key", self.credentials.session_key.as_str());
        fields.push("api_key", self.credentials.api_key.as_str());
        fields.push("v", self.credentials.api_version.as_str());
        fields.push("call_id", next_call_id().to_string());
        fields.push("format", "JSON");
        let sig = compute_signature(&fields, &self.credentials.secret);
        fields.push(SIGNATURE_FIELD, sig);
        fields
    }

    async fn call(&self, method: &str, params: FormFields) -> Result<Value> {
        let mut fields = FormFields::new().with("method", method);
        for (name, value) in params.iter() {
            fields.push(name, value);
        }
        let fields = self.sign(fields);

        log::debug!("Calling {}", method);
        let response = self.http.post(&self.endpoint).form(&fields).send().await?;
        Self::read_response(response).await
    }

    async fn submit_multipart(
        &self,
        body: MultipartBody,
        on_progress: FractionCallback,
    ) -> Result<Value> {
        let content_type = body.content_type();
        let total = body.len();
        let stream = ProgressStream::new(body.into_stream(self.chunk_size), total, on_progress);

        log::debug!("Submitting multipart body of {} bytes", total);
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, content_type)
            .header(CONTENT_LENGTH, total)
            .header("MIME-version", "1.0")
            .body(reqwest::Body::wrap_stream(stream))
            .send()
            .await?;
        Self::read_response(response).await
    }
}
