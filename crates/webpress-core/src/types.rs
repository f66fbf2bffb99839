//! Core data types for the webpress conversion pipeline.
//!
//! These types describe a single conversion request (source image, target size,
//! quality) and what it produces (converted image, metadata, the aggregated
//! [`ConversionResult`]).

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::ImageFormat;
use serde::{Deserialize, Serialize, Serializer};
use std::path::Path;
use std::str::FromStr;

use crate::error::{ConversionError, ErrorKind};

/// MIME type of every converted image.
pub const WEBP_MIME: &str = "image/webp";

/// Input formats the pipeline accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
}

impl SourceFormat {
    /// All accepted formats, in allowlist order.
    pub const ALL: [SourceFormat; 5] = [
        SourceFormat::Jpeg,
        SourceFormat::Png,
        SourceFormat::Gif,
        SourceFormat::Bmp,
        SourceFormat::WebP,
    ];

    /// Map a MIME type onto an accepted format (case-insensitive).
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/bmp" | "image/x-ms-bmp" => Some(Self::Bmp),
            "image/webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Canonical MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::WebP => "image/webp",
        }
    }

    /// Decoder format tag used to dispatch decoding.
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
            Self::Bmp => ImageFormat::Bmp,
            Self::WebP => ImageFormat::WebP,
        }
    }

    /// Whether the destination canvas starts transparent for this format.
    ///
    /// Only PNG sources keep their alpha channel; every other source is
    /// flattened onto an opaque canvas.
    pub fn keeps_transparency(self) -> bool {
        matches!(self, Self::Png)
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mime())
    }
}

/// Bits per channel as reported by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Known(u8),
    Unknown,
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BitDepth::Known(bits) => write!(f, "{bits}"),
            BitDepth::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for BitDepth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BitDepth::Known(bits) => serializer.serialize_u8(*bits),
            BitDepth::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

/// Lossy WebP quality (1-100, default 80). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quality(u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Quality from an optional raw value; absent means the default.
    pub fn from_option(value: Option<i64>) -> Self {
        match value {
            Some(v) => Self::new(v.clamp(1, 100) as u32),
            None => Self::default(),
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Named target sizes offered as an alternative to custom dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizePreset {
    Header,
    Thumbnail,
    Featured,
    Internal,
    Gallery,
}

impl SizePreset {
    pub const ALL: [SizePreset; 5] = [
        SizePreset::Header,
        SizePreset::Thumbnail,
        SizePreset::Featured,
        SizePreset::Internal,
        SizePreset::Gallery,
    ];

    /// Fixed (width, height) for this preset.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Header => (1500, 500),
            Self::Thumbnail => (300, 200),
            Self::Featured => (1200, 630),
            Self::Internal => (500, 500),
            Self::Gallery => (150, 150),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Header => "header",
            Self::Thumbnail => "thumbnail",
            Self::Featured => "featured",
            Self::Internal => "internal",
            Self::Gallery => "gallery",
        }
    }

    /// Human label shown next to the preset in pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Header => "Main Header Images",
            Self::Thumbnail => "Blog Post Thumbnails",
            Self::Featured => "Featured Images",
            Self::Internal => "Internal Page Images",
            Self::Gallery => "Gallery Thumbnails",
        }
    }
}

impl FromStr for SizePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| format!("unknown size preset: {s}"))
    }
}

/// Requested output size: a preset or explicit dimensions.
///
/// Custom dimensions are kept signed so out-of-range input from a form or
/// command line survives until [`resolve`](crate::pipeline::resolve) rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeRequest {
    Preset(SizePreset),
    Custom { width: i64, height: i64 },
}

impl Default for SizeRequest {
    fn default() -> Self {
        Self::Preset(SizePreset::Header)
    }
}

impl FromStr for SizeRequest {
    type Err = String;

    /// Parses a preset name (`gallery`) or `WIDTHxHEIGHT` (`800x600`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(preset) = s.parse::<SizePreset>() {
            return Ok(Self::Preset(preset));
        }
        let (w, h) = s
            .trim()
            .split_once(['x', 'X', '×'])
            .ok_or_else(|| format!("expected a preset name or WIDTHxHEIGHT, got: {s}"))?;
        let width = w
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid width '{w}': {e}"))?;
        let height = h
            .trim()
            .parse::<i64>()
            .map_err(|e| format!("invalid height '{h}': {e}"))?;
        Ok(Self::Custom { width, height })
    }
}

impl std::fmt::Display for SizeRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SizeRequest::Preset(p) => f.write_str(p.name()),
            SizeRequest::Custom { width, height } => write!(f, "{width}x{height}"),
        }
    }
}

/// A validated upload, ready for the codec pipeline.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub(crate) bytes: Vec<u8>,
    pub(crate) format: SourceFormat,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) bit_depth: BitDepth,
    pub(crate) has_alpha: bool,
}

impl SourceImage {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn mime(&self) -> &'static str {
        self.format.mime()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    /// Release the source, handing back the original bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Output of the codec pipeline.
#[derive(Debug, Clone)]
pub struct ConvertedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}

/// Descriptive statistics for one image.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMetadata {
    /// Byte length / 1024, rounded to 2 decimals
    pub size_kb: f64,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    /// width / height, rounded to 2 decimals
    pub aspect_ratio: f64,
    pub bit_depth: BitDepth,
    /// Only set on converted-image metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,
}

impl ImageMetadata {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// "12.34 KB"
    pub fn size_label(&self) -> String {
        format!("{} KB", self.size_kb)
    }

    /// "150 × 150"
    pub fn dimensions_label(&self) -> String {
        format!("{} × {}", self.width, self.height)
    }

    /// "80%"
    pub fn quality_label(&self) -> Option<String> {
        self.quality.map(|q| q.to_string())
    }

    /// Display-ready view of the record.
    pub fn display(&self) -> MetadataDisplay {
        MetadataDisplay {
            size: self.size_label(),
            mime_type: self.mime_type.clone(),
            dimensions: self.dimensions_label(),
            aspect_ratio: self.aspect_ratio,
            bits: self.bit_depth,
            quality: self.quality_label(),
        }
    }
}

/// Human-readable rendering of [`ImageMetadata`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataDisplay {
    pub size: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub dimensions: String,
    pub aspect_ratio: f64,
    pub bits: BitDepth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
}

/// Error descriptor recorded on a failed [`ConversionResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversionFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&ConversionError> for ConversionFailure {
    fn from(err: &ConversionError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Everything one conversion request produced.
///
/// Either fully formed (original bytes, converted bytes, both metadata
/// records) or carrying only an error. The one exception is a result built by
/// [`ConversionResult::from_converted_bytes`], which holds nothing but
/// externally supplied converted bytes for the persistence hand-off.
#[derive(Debug, Clone, Default)]
pub struct ConversionResult {
    file_name: Option<String>,
    original: Option<Vec<u8>>,
    original_meta: Option<ImageMetadata>,
    converted: Option<Vec<u8>>,
    converted_meta: Option<ImageMetadata>,
    error: Option<ConversionFailure>,
}

impl ConversionResult {
    pub(crate) fn succeeded(
        file_name: &str,
        original: Vec<u8>,
        original_meta: ImageMetadata,
        converted: Vec<u8>,
        converted_meta: ImageMetadata,
    ) -> Self {
        Self {
            file_name: non_empty(file_name),
            original: Some(original),
            original_meta: Some(original_meta),
            converted: Some(converted),
            converted_meta: Some(converted_meta),
            error: None,
        }
    }

    pub(crate) fn failed(file_name: &str, err: &ConversionError) -> Self {
        Self {
            file_name: non_empty(file_name),
            error: Some(ConversionFailure::from(err)),
            ..Self::default()
        }
    }

    /// A result carrying only externally obtained converted bytes.
    ///
    /// Skips the pipeline entirely; used to hand bytes re-encoded elsewhere
    /// (for example by a browser client) to the persistence gateway.
    pub fn from_converted_bytes(bytes: Vec<u8>) -> Self {
        Self {
            converted: Some(bytes),
            ..Self::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.converted.is_some()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn original_bytes(&self) -> Option<&[u8]> {
        self.original.as_deref()
    }

    pub fn converted_bytes(&self) -> Option<&[u8]> {
        self.converted.as_deref()
    }

    pub fn original_metadata(&self) -> Option<&ImageMetadata> {
        self.original_meta.as_ref()
    }

    pub fn converted_metadata(&self) -> Option<&ImageMetadata> {
        self.converted_meta.as_ref()
    }

    pub fn error(&self) -> Option<&ConversionFailure> {
        self.error.as_ref()
    }

    /// Error message, or an empty string on success.
    pub fn error_message(&self) -> &str {
        self.error.as_ref().map(|e| e.message.as_str()).unwrap_or("")
    }

    /// Original bytes as a `data:` URL for inline display.
    pub fn original_data_url(&self) -> Option<String> {
        let mime = self.original_meta.as_ref()?.mime_type.as_str();
        Some(to_data_url(mime, self.original.as_deref()?))
    }

    /// Converted bytes as a `data:image/webp;base64,` URL.
    pub fn converted_data_url(&self) -> Option<String> {
        Some(to_data_url(WEBP_MIME, self.converted.as_deref()?))
    }

    /// Save title derived from the upload name: `photo.jpg` → `photo-webp`.
    pub fn suggested_title(&self) -> Option<String> {
        let name = self.file_name.as_deref()?;
        let stem = Path::new(name)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or(name);
        Some(format!("{stem}-webp"))
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", BASE64.encode(bytes))
}

/// Decode a base64 WebP payload, with or without its `data:` URL prefix.
pub fn decode_data_url(payload: &str) -> Result<Vec<u8>, ConversionError> {
    let payload = payload.trim();
    let payload = payload
        .strip_prefix("data:image/webp;base64,")
        .unwrap_or(payload);
    if payload.is_empty() {
        return Err(ConversionError::NoImageAvailable);
    }
    let bytes = BASE64
        .decode(payload)
        .map_err(|e| ConversionError::DecodeFailure {
            message: format!("Invalid base64 image data: {e}"),
        })?;
    if bytes.is_empty() {
        return Err(ConversionError::NoImageAvailable);
    }
    Ok(bytes)
}
