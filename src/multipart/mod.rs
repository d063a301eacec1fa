//! Multipart request bodies
//!
//! This module encodes form fields plus one binary file part as
//! `multipart/form-data`, and wraps the encoded body in a stream that
//! reports transfer progress.

pub mod encoder;
pub mod fields;
pub mod streaming;

pub use encoder::{MultipartBody, MultipartEncoder, BOUNDARY, FILE_FIELD};
pub use fields::FormFields;
pub use streaming::{FractionCallback, ProgressStream};
