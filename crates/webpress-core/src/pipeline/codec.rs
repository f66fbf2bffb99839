//! Decode → canvas → resample → lossy WebP.
//!
//! Every bitmap allocated here lives only for the duration of [`convert`];
//! the decoded source and the destination canvas are dropped on every exit
//! path, leaving the encoded bytes as the only output.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

use super::decode::decode;
use crate::error::{ConversionError, PipelineResult};
use crate::types::{ConvertedImage, Quality, SourceImage};

/// Largest width or height the WebP bitstream can describe.
pub const WEBP_MAX_DIMENSION: u32 = 16383;

/// Resampling filter. A tent filter widened by the scale factor, so
/// downscales average over the covered source area.
const RESAMPLE_FILTER: FilterType = FilterType::Triangle;

/// Destination bitmap, transparent or opaque depending on the source format.
#[derive(Debug, Clone)]
pub enum Canvas {
    Transparent(RgbaImage),
    Opaque(RgbImage),
}

impl Canvas {
    /// Allocate a blank `width × height` canvas.
    ///
    /// Transparent canvases start fully transparent white; opaque ones start
    /// black.
    pub fn allocate(width: u32, height: u32, transparent: bool) -> PipelineResult<Self> {
        if width == 0 || height == 0 {
            return Err(ConversionError::EncodeFailure {
                message: format!("cannot encode a zero-area canvas ({width} × {height})"),
            });
        }
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(ConversionError::EncodeFailure {
                message: format!(
                    "canvas {width} × {height} exceeds the WebP limit of {WEBP_MAX_DIMENSION}px"
                ),
            });
        }
        Ok(if transparent {
            Canvas::Transparent(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 0])))
        } else {
            Canvas::Opaque(RgbImage::from_pixel(width, height, Rgb([0, 0, 0])))
        })
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Canvas::Transparent(img) => img.dimensions(),
            Canvas::Opaque(img) => img.dimensions(),
        }
    }

    /// Stretch the whole `source` over the whole canvas.
    ///
    /// Transparent canvases take the resampled pixels as-is, alpha included.
    /// Opaque canvases composite them over the existing background.
    pub fn paint(&mut self, source: &DynamicImage) {
        match self {
            Canvas::Transparent(canvas) => {
                let (w, h) = canvas.dimensions();
                let resized = imageops::resize(&source.to_rgba8(), w, h, RESAMPLE_FILTER);
                imageops::replace(canvas, &resized, 0, 0);
            }
            Canvas::Opaque(canvas) => {
                let (w, h) = canvas.dimensions();
                if source.color().has_alpha() {
                    let resized = imageops::resize(&source.to_rgba8(), w, h, RESAMPLE_FILTER);
                    for (dst, src) in canvas.pixels_mut().zip(resized.pixels()) {
                        *dst = blend_over(*dst, *src);
                    }
                } else {
                    let resized = imageops::resize(&source.to_rgb8(), w, h, RESAMPLE_FILTER);
                    imageops::replace(canvas, &resized, 0, 0);
                }
            }
        }
    }

    /// Serialize as lossy WebP.
    pub fn encode(&self, quality: Quality) -> PipelineResult<Vec<u8>> {
        let (width, height) = self.dimensions();
        let encoder = match self {
            Canvas::Transparent(img) => webp::Encoder::from_rgba(img.as_raw(), width, height),
            Canvas::Opaque(img) => webp::Encoder::from_rgb(img.as_raw(), width, height),
        };
        let encoded = encoder
            .encode_simple(false, quality.value() as f32)
            .map_err(|e| ConversionError::EncodeFailure {
                message: format!("{e:?}"),
            })?;
        if encoded.is_empty() {
            return Err(ConversionError::EncodeFailure {
                message: "encoder produced no output".to_string(),
            });
        }
        Ok(encoded.to_vec())
    }
}

/// Alpha-composite `src` over an opaque `dst`.
fn blend_over(dst: Rgb<u8>, src: Rgba<u8>) -> Rgb<u8> {
    let alpha = u32::from(src[3]);
    let mix = |s: u8, d: u8| ((u32::from(s) * alpha + u32::from(d) * (255 - alpha) + 127) / 255) as u8;
    Rgb([mix(src[0], dst[0]), mix(src[1], dst[1]), mix(src[2], dst[2])])
}

/// Convert a validated source into a `target`-sized lossy WebP.
///
/// The source is stretched to fill the target exactly; aspect ratio is not
/// preserved.
pub fn convert(
    source: &SourceImage,
    target: (u32, u32),
    quality: Quality,
) -> PipelineResult<ConvertedImage> {
    let (width, height) = target;

    let decode_start = std::time::Instant::now();
    let decoded = decode(source)?;
    tracing::trace!("  Decode: {:?}", decode_start.elapsed());

    let mut canvas = Canvas::allocate(width, height, source.format().keeps_transparency())?;
    let resample_start = std::time::Instant::now();
    canvas.paint(&decoded);
    drop(decoded);
    tracing::trace!("  Resample: {:?}", resample_start.elapsed());

    let encode_start = std::time::Instant::now();
    let bytes = canvas.encode(quality)?;
    tracing::trace!("  Encode: {:?}", encode_start.elapsed());

    Ok(ConvertedImage {
        bytes,
        width,
        height,
        quality,
    })
}
