//! `multipart/form-data` body construction

use crate::multipart::fields::FormFields;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream};
use std::convert::Infallible;

/// Boundary token shared by the part headers and the `Content-Type` header
pub const BOUNDARY: &str = "facebookPhotoUploaderBoundary";

const EOL: &str = "\r\n";

/// Form field name of the file part
pub const FILE_FIELD: &str = "filename";

/// Builds multipart bodies with a fixed boundary
#[derive(Debug, Clone)]
pub struct MultipartEncoder {
    boundary: String,
}

impl Default for MultipartEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartEncoder {
    pub fn new() -> Self {
        Self {
            boundary: BOUNDARY.to_string(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Encode `fields` followed by one file part holding `image`
    ///
    /// Field values are written as given; a value containing the boundary
    /// would corrupt the body.
    pub fn encode(&self, filename: &str, fields: &FormFields, image: Bytes) -> MultipartBody {
        let mut header = String::new();
        for (name, value) in fields.iter() {
            header.push_str(&format!("--{}{}", self.boundary, EOL));
            header.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"{}{}",
                name, EOL, EOL
            ));
            header.push_str(value);
            header.push_str(EOL);
        }

        header.push_str(&format!("--{}{}", self.boundary, EOL));
        header.push_str(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"{}",
            FILE_FIELD,
            quoted_filename(filename),
            EOL
        ));
        header.push_str(&format!("Content-Type: application/octet-stream{}{}", EOL, EOL));

        let trailer = format!("{}--{}--{}", EOL, self.boundary, EOL);

        MultipartBody {
            boundary: self.boundary.clone(),
            header: Bytes::from(header.into_bytes()),
            payload: image,
            trailer: Bytes::from(trailer.into_bytes()),
        }
    }
}

/// Percent-encode the characters that would end the quoted file name or the
/// header line
fn quoted_filename(filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len());
    for c in filename.chars() {
        match c {
            '"' => quoted.push_str("%22"),
            '\r' => quoted.push_str("%0D"),
            '\n' => quoted.push_str("%0A"),
            c => quoted.push(c),
        }
    }
    quoted
}

/// An encoded body: UTF-8 part headers, raw image bytes, closing boundary
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    header: Bytes,
    payload: Bytes,
    trailer: Bytes,
}

impl MultipartBody {
    /// Value for the request's `Content-Type` header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Total body length in bytes
    pub fn len(&self) -> usize {
        self.header.len() + self.payload.len() + self.trailer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole body in one buffer
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.len());
        buf.extend_from_slice(&self.header);
        buf.extend_from_slice(&self.payload);
        buf.extend_from_slice(&self.trailer);
        buf.freeze()
    }

    /// The body as a stream of chunks of at most `chunk_size` bytes
    ///
    /// Chunks are slices of the original buffers, nothing is copied.
    pub fn into_stream(
        self,
        chunk_size: usize,
    ) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + Unpin + 'static {
        let chunk_size = chunk_size.max(1);
        let mut chunks = Vec::new();
        for part in [self.header, self.payload, self.trailer] {
            let mut offset = 0;
            while offset < part.len() {
                let end = (offset + chunk_size).min(part.len());
                chunks.push(Ok(part.slice(offset..end)));
                offset = end;
            }
        }
        stream::iter(chunks)
    }
}
