//! Image resizing before upload
//!
//! The pipeline talks to a [`ResizeService`]; [`ImageResizer`] is the
//! implementation backed by the `image` crate.

pub mod codec;

pub use codec::ImageResizer;

use crate::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Shrinks an image so it fits within a bounding box
///
/// Images already within the box come back unchanged. Otherwise the result is
/// re-encoded in the same format, with the aspect ratio kept and the larger
/// side clamped to the bound. Failures are `ResizeFailure`.
#[async_trait]
pub trait ResizeService: Send + Sync {
    async fn resize(&self, image: Bytes, mime_type: &str, max_width: u32, max_height: u32)
        -> Result<Bytes>;
}

/// Target dimensions for a `width`×`height` image inside `max_width`×`max_height`
///
/// Returns `None` when the image already fits. Otherwise both sides are scaled
/// by the same ratio, rounded, and kept at least 1px.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    if width <= max_width && height <= max_height {
        return None;
    }

    let ratio = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let scale = |side: u32| ((side as f64 * ratio).round() as u32).max(1);
    Some((scale(width), scale(height)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(1208, 604, 604, 604), Some((604, 302)));
        assert_eq!(fit_within(604, 1208, 604, 604), Some((302, 604)));
        assert_eq!(fit_within(3000, 2000, 604, 604), Some((604, 403)));
        assert_eq!(fit_within(10000, 1, 604, 604), Some((604, 1)));
    }

    #[test]
    fn test_inside_bound_is_left_alone() {
        assert_eq!(fit_within(604, 604, 604, 604), None);
        assert_eq!(fit_within(20, 600, 604, 604), None);
    }
}
