//! Before/after metadata derivation.

use crate::error::{ConversionError, PipelineResult};
use crate::types::{BitDepth, ImageMetadata, Quality};

/// Derives [`ImageMetadata`] from bytes and known dimensions.
pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Describe an image.
    ///
    /// `quality` is only passed for converted images. Bit depth is whatever
    /// the decoder reported; nothing is inferred.
    pub fn describe(
        bytes: &[u8],
        mime_type: &str,
        width: u32,
        height: u32,
        bit_depth: BitDepth,
        quality: Option<Quality>,
    ) -> PipelineResult<ImageMetadata> {
        if height == 0 {
            return Err(ConversionError::DegenerateDimensions { width, height });
        }
        Ok(ImageMetadata {
            size_kb: round2(bytes.len() as f64 / 1024.0),
            mime_type: mime_type.to_string(),
            width,
            height,
            aspect_ratio: round2(f64::from(width) / f64::from(height)),
            bit_depth,
            quality,
        })
    }
}

/// Round half away from zero to two decimals.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
