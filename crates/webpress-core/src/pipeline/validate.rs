//! Input validation before decode.

use crate::config::LimitsConfig;
use crate::error::{ConversionError, PipelineResult};
use crate::types::{SourceFormat, SourceImage};

/// MIME reported for buffers whose signature matches nothing we know.
const UNKNOWN_MIME: &str = "application/octet-stream";

/// Validates uploads before any pixel work.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    /// Create a new validator with the given limits.
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Turn raw upload bytes into a [`SourceImage`].
    ///
    /// Checks:
    /// - Buffer size is within limits
    /// - Magic bytes identify an allowed format
    /// - The header is readable and its dimensions are within limits
    pub fn validate(&self, bytes: Vec<u8>) -> PipelineResult<SourceImage> {
        let max_bytes = self.limits.max_file_size_mb.saturating_mul(1024 * 1024);
        if bytes.len() as u64 > max_bytes {
            return Err(ConversionError::FileTooLarge {
                size_mb: bytes.len() as u64 / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let mime = sniff_mime(&bytes).unwrap_or(UNKNOWN_MIME);
        let format = SourceFormat::from_mime(mime).ok_or_else(|| {
            ConversionError::UnsupportedFormat {
                mime: mime.to_string(),
            }
        })?;

        let source = SourceImage::with_format(bytes, format)?;
        let max_dim = self.limits.max_image_dimension;
        if source.width() > max_dim || source.height() > max_dim {
            return Err(ConversionError::ImageTooLarge {
                width: source.width(),
                height: source.height(),
                max_dim,
            });
        }
        Ok(source)
    }

    /// Reject output sizes above the configured dimension limit before any
    /// canvas is allocated.
    pub fn check_target(&self, target: (u32, u32)) -> PipelineResult<()> {
        let (width, height) = target;
        let max_dim = self.limits.max_image_dimension;
        if width > max_dim || height > max_dim {
            return Err(ConversionError::TargetTooLarge {
                width,
                height,
                max_dim,
            });
        }
        Ok(())
    }
}

/// DIB header sizes: CORE, INFO, V2, V3, V4, V5.
const BMP_DIB_HEADER_SIZES: [u32; 6] = [12, 40, 52, 56, 108, 124];

/// `BM`, a 14-byte file header, then a DIB header of a known size.
fn is_bmp(bytes: &[u8]) -> bool {
    if bytes.len() < 18 || !bytes.starts_with(b"BM") {
        return false;
    }
    let dib_size = u32::from_le_bytes([bytes[14], bytes[15], bytes[16], bytes[17]]);
    BMP_DIB_HEADER_SIZES.contains(&dib_size)
}

/// Identify an image MIME type from its leading signature bytes.
///
/// Recognises more than the pipeline accepts so rejections can name what was
/// actually uploaded.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    let header = &bytes[..bytes.len().min(12)];
    if header.len() < 2 {
        return None;
    }

    // JPEG: FF D8 FF
    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }

    // PNG: 89 50 4E 47
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }

    // GIF: GIF8
    if header.starts_with(b"GIF8") {
        return Some("image/gif");
    }

    // WebP: RIFF....WEBP
    if header.len() >= 12 && header.starts_with(b"RIFF") && &header[8..12] == b"WEBP" {
        return Some("image/webp");
    }

    // BMP: BM + plausible DIB header size
    if is_bmp(bytes) {
        return Some("image/bmp");
    }

    // TIFF: II (little-endian) or MM (big-endian) followed by version 42
    if header.starts_with(&[b'I', b'I', 0x2A, 0x00]) || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
    {
        return Some("image/tiff");
    }

    // HEIC/HEIF/AVIF: ftyp box at offset 4
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return Some(match &header[8..12] {
            b"avif" | b"avis" => "image/avif",
            _ => "image/heic",
        });
    }

    None
}
