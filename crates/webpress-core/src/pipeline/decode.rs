//! Header inspection and full decoding, dispatched on [`SourceFormat`].

use image::{DynamicImage, ImageDecoder, ImageReader};
use std::io::Cursor;

use crate::error::{ConversionError, PipelineResult};
use crate::types::{BitDepth, SourceFormat, SourceImage};

/// What an image header reveals without decoding pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderInfo {
    pub width: u32,
    pub height: u32,
    pub bit_depth: BitDepth,
    pub has_alpha: bool,
}

/// Read dimensions and color layout from the header of `bytes`.
pub fn inspect(bytes: &[u8], format: SourceFormat) -> PipelineResult<HeaderInfo> {
    let reader = ImageReader::with_format(Cursor::new(bytes), format.image_format());
    let decoder = reader
        .into_decoder()
        .map_err(|e| ConversionError::DecodeFailure {
            message: format!("Cannot read {} header: {}", format, e),
        })?;

    let (width, height) = decoder.dimensions();
    let color = decoder.color_type();
    let channels = u16::from(color.channel_count());
    let bit_depth = match color.bits_per_pixel().checked_div(channels) {
        Some(bits) => u8::try_from(bits).map_or(BitDepth::Unknown, BitDepth::Known),
        None => BitDepth::Unknown,
    };

    Ok(HeaderInfo {
        width,
        height,
        bit_depth,
        has_alpha: color.has_alpha(),
    })
}

/// Decode the full bitmap at native resolution.
///
/// Corrupt or truncated streams fail with `DecodeFailure`; no partial bitmap
/// is ever returned.
pub fn decode(source: &SourceImage) -> PipelineResult<DynamicImage> {
    image::load_from_memory_with_format(source.bytes(), source.format().image_format()).map_err(
        |e| ConversionError::DecodeFailure {
            message: format!("Failed to create image resource from {}: {}", source.format(), e),
        },
    )
}

impl SourceImage {
    /// Build a source image from bytes and a declared MIME type.
    ///
    /// The MIME allowlist is checked before the header is touched, so an
    /// unsupported type never reaches a decoder.
    pub fn from_declared(bytes: Vec<u8>, mime: &str) -> PipelineResult<Self> {
        let format = SourceFormat::from_mime(mime).ok_or_else(|| {
            ConversionError::UnsupportedFormat {
                mime: mime.to_string(),
            }
        })?;
        Self::with_format(bytes, format)
    }

    pub(crate) fn with_format(bytes: Vec<u8>, format: SourceFormat) -> PipelineResult<Self> {
        let header = inspect(&bytes, format)?;
        Ok(Self {
            bytes,
            format,
            width: header.width,
            height: header.height,
            bit_depth: header.bit_depth,
            has_alpha: header.has_alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_images;

    #[test]
    fn test_inspect_reads_png_header() {
        let bytes = test_images::png_rgba(7, 5);
        let header = inspect(&bytes, SourceFormat::Png).unwrap();
        assert_eq!((header.width, header.height), (7, 5));
        assert_eq!(header.bit_depth, BitDepth::Known(8));
        assert!(header.has_alpha);
    }

    #[test]
    fn test_inspect_reads_jpeg_header() {
        let bytes = test_images::jpeg(32, 16);
        let header = inspect(&bytes, SourceFormat::Jpeg).unwrap();
        assert_eq!((header.width, header.height), (32, 16));
        assert!(!header.has_alpha);
    }

    #[test]
    fn test_inspect_rejects_garbage() {
        let err = inspect(b"definitely not a png", SourceFormat::Png).unwrap_err();
        assert!(matches!(err, ConversionError::DecodeFailure { .. }));
    }

    #[test]
    fn test_from_declared_rejects_unsupported_mime() {
        let err = SourceImage::from_declared(test_images::jpeg(4, 4), "image/tiff").unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedFormat { ref mime } if mime == "image/tiff"));

        let err = SourceImage::from_declared(b"hello".to_vec(), "text/plain").unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_decode_truncated_stream_fails() {
        let mut bytes = test_images::png_rgba(16, 16);
        let source = SourceImage::from_declared(bytes.clone(), "image/png").unwrap();
        assert!(decode(&source).is_ok());

        bytes.truncate(bytes.len() / 2);
        let truncated = SourceImage {
            bytes,
            ..source
        };
        let err = decode(&truncated).unwrap_err();
        assert!(matches!(err, ConversionError::DecodeFailure { .. }));
    }
}
