//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use photo_uploader::multipart::FractionCallback;
use photo_uploader::{
    collection, FormFields, MultipartBody, PhotoCollection, PhotoKey, ProgressStream, RemoteApi,
    ResizeService, Result, SharedCollection, UploaderError, UserId,
};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// A non-multipart call the mock received
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: String,
    pub params: FormFields,
}

/// In-process stand-in for the remote API
///
/// Uploads are answered with `{"pid": "<1000 + n>"}`, tag calls with the
/// configured response.
pub struct MockApi {
    calls: Mutex<Vec<RecordedCall>>,
    uploads: Mutex<Vec<Bytes>>,
    upload_attempts: AtomicUsize,
    fail_upload_at: Option<(usize, i64, String)>,
    tag_response: Value,
    gate: Option<Arc<Semaphore>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            upload_attempts: AtomicUsize::new(0),
            fail_upload_at: None,
            tag_response: json!(true),
            gate: None,
        }
    }

    /// Answer upload number `index` (0-based) with an API error
    pub fn fail_upload_at(mut self, index: usize, code: i64, message: &str) -> Self {
        self.fail_upload_at = Some((index, code, message.to_string()));
        self
    }

    pub fn tag_response(mut self, response: Value) -> Self {
        self.tag_response = response;
        self
    }

    /// Make every upload wait for a permit from `gate`
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.method == method)
            .collect()
    }

    /// Bodies of the uploads that succeeded
    pub fn uploads(&self) -> Vec<Bytes> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn upload_attempts(&self) -> usize {
        self.upload_attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteApi for MockApi {
    fn user_id(&self) -> UserId {
        UserId::new("4242".to_string())
    }

    fn sign(&self, fields: FormFields) -> FormFields {
        fields.with("sig", "test-signature")
    }

    async fn call(&self, method: &str, params: FormFields) -> Result<Value> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            params,
        });
        Ok(self.tag_response.clone())
    }

    async fn submit_multipart(
        &self,
        body: MultipartBody,
        on_progress: FractionCallback,
    ) -> Result<Value> {
        let attempt = self.upload_attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| UploaderError::transport_failure(e.to_string()))?
                .forget();
        }

        let total = body.len();
        let mut stream = ProgressStream::new(body.into_stream(64), total, on_progress);
        let mut received = Vec::with_capacity(total);
        while let Some(chunk) = stream.next().await {
            received.extend_from_slice(&chunk.unwrap());
        }

        if let Some((index, code, message)) = &self.fail_upload_at {
            if *index == attempt {
                return Err(UploaderError::server_error(*code, message.clone()));
            }
        }

        self.uploads.lock().unwrap().push(Bytes::from(received));
        Ok(json!({ "pid": format!("{}", 1000 + attempt) }))
    }
}

/// Resizer returning its input, counting calls
#[derive(Default)]
pub struct PassThroughResizer {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ResizeService for PassThroughResizer {
    async fn resize(&self, image: Bytes, _: &str, _: u32, _: u32) -> Result<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(image)
    }
}

/// Resizer that always fails
pub struct BrokenResizer;

#[async_trait]
impl ResizeService for BrokenResizer {
    async fn resize(&self, _: Bytes, _: &str, _: u32, _: u32) -> Result<Bytes> {
        Err(UploaderError::resize_failure("encoder exploded"))
    }
}

/// Write a `size` byte file called `name` into `dir`
pub fn write_photo(dir: &Path, name: &str, size: usize) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0xAB; size]).unwrap();
    path
}

/// A shared collection with one `.jpg` photo per entry of `sizes`
pub fn collection_of(dir: &Path, sizes: &[usize]) -> (SharedCollection, Vec<PhotoKey>) {
    let files: Vec<PathBuf> = sizes
        .iter()
        .enumerate()
        .map(|(i, size)| write_photo(dir, &format!("photo_{}.jpg", i + 1), *size))
        .collect();
    let mut photos = PhotoCollection::new();
    let keys = photos.add(files);
    (collection::shared(photos), keys)
}
