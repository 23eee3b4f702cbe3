//! JPEG thumbnails that fit inside a square bounding box.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView};
use std::io::Cursor;

#[derive(Debug, thiserror::Error)]
pub enum ThumbnailError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode thumbnail: {0}")]
    Encode(String),
}

/// A generated thumbnail.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Bytes,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    pub const CONTENT_TYPE: &'static str = "image/jpeg";
    pub const EXTENSION: &'static str = "jpg";
}

/// Downscales images to fit within `max_dimension` and re-encodes them as JPEG.
/// Images that already fit are re-encoded at their original size.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailGenerator {
    max_dimension: u32,
    quality: u8,
}

impl ThumbnailGenerator {
    pub fn new(max_dimension: u32, quality: u8) -> Self {
        Self {
            max_dimension: max_dimension.max(1),
            quality: quality.clamp(1, 100),
        }
    }

    /// Decode `data`, shrink it if needed and encode the result.
    ///
    /// Formats the decoder does not know (HEIC) fail with `ThumbnailError::Decode`.
    pub fn generate(&self, data: &[u8]) -> Result<Thumbnail, ThumbnailError> {
        let img = image::ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ThumbnailError::Decode(e.to_string()))?
            .decode()
            .map_err(|e| ThumbnailError::Decode(e.to_string()))?;

        let (width, height) = img.dimensions();
        let img = if width > self.max_dimension || height > self.max_dimension {
            img.thumbnail(self.max_dimension, self.max_dimension)
        } else {
            img
        };

        // JPEG has no alpha channel
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        let (width, height) = rgb.dimensions();

        let mut buffer = Vec::with_capacity((width * height) as usize);
        let encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
        rgb.write_with_encoder(encoder)
            .map_err(|e| ThumbnailError::Encode(e.to_string()))?;

        tracing::debug!(
            width,
            height,
            size_bytes = buffer.len(),
            "Thumbnail generated"
        );

        Ok(Thumbnail {
            data: Bytes::from(buffer),
            width,
            height,
        })
    }
}
