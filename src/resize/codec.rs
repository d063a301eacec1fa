use crate::error::{Result, UploaderError};
use crate::resize::{fit_within, ResizeService};
use async_trait::async_trait;
use bytes::Bytes;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Resizer decoding and re-encoding with the `image` crate
///
/// Decoding runs on the blocking thread pool.
#[derive(Debug, Clone)]
pub struct ImageResizer {
    filter: FilterType,
}

impl Default for ImageResizer {
    fn default() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }
}

impl ImageResizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    fn resize_blocking(
        &self,
        data: Bytes,
        mime_type: &str,
        max_width: u32,
        max_height: u32,
    ) -> Result<Bytes> {
        let format = ImageFormat::from_mime_type(mime_type).ok_or_else(|| {
            UploaderError::resize_failure(format!("Unsupported image type {}", mime_type))
        })?;

        let img = image::load_from_memory_with_format(&data, format)
            .map_err(|e| UploaderError::resize_failure(format!("Cannot decode image: {}", e)))?;

        let Some((width, height)) = fit_within(img.width(), img.height(), max_width, max_height)
        else {
            log::debug!(
                "Image is {}x{}, within {}x{}",
                img.width(),
                img.height(),
                max_width,
                max_height
            );
            return Ok(data);
        };

        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            img.width(),
            img.height(),
            width,
            height
        );
        let resized = img.resize_exact(width, height, self.filter);
        // JPEG has no alpha channel
        let resized = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(resized.to_rgb8()),
            _ => resized,
        };

        let mut buffer = Vec::new();
        resized
            .write_to(&mut Cursor::new(&mut buffer), format)
            .map_err(|e| UploaderError::resize_failure(format!("Cannot encode image: {}", e)))?;
        Ok(Bytes::from(buffer))
    }
}

#[async_trait]
impl ResizeService for ImageResizer {
    async fn resize(
        &self,
        image: Bytes,
        mime_type: &str,
        max_width: u32,
        max_height: u32,
    ) -> Result<Bytes> {
        let resizer = self.clone();
        let mime_type = mime_type.to_string();
        tokio::task::spawn_blocking(move || {
            resizer.resize_blocking(image, &mime_type, max_width, max_height)
        })
        .await
        .map_err(|e| UploaderError::resize_failure(format!("Resize task failed: {}", e)))?
    }
}
