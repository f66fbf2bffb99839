//! Webpress Core - image to WebP conversion library.
//!
//! Takes one uploaded raster image (JPEG, PNG, GIF, BMP or WebP), resizes it
//! to a preset or custom size, encodes it as lossy WebP at a chosen quality,
//! and reports before/after metadata. Finished images can be handed to an
//! asset store.
//!
//! # Architecture
//!
//! ```text
//! Bytes → Validate → Resolve size → Decode → Canvas/Resample → WebP → Metadata
//!                                                                  ↓
//!                                                   ConversionResult → AssetStore
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use webpress_core::{ConversionSession, Quality, SizePreset, SizeRequest};
//!
//! let session = ConversionSession::with_defaults();
//! let bytes = std::fs::read("photo.jpg")?;
//! let result = session.process(
//!     bytes,
//!     "photo.jpg",
//!     &SizeRequest::Preset(SizePreset::Featured),
//!     Quality::new(80),
//! );
//! println!("{:?}", result.converted_metadata());
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, ConversionError, ErrorKind, PipelineResult, StoreError};
pub use events::{Event, EventLevel, EventSink, NullSink, RecordingSink, TracingSink};
pub use output::{ConversionReport, OutputWriter};
pub use pipeline::{ConversionSession, MetadataExtractor};
pub use store::{AssetRef, AssetStore, FsAssetStore};
pub use types::{
    decode_data_url, BitDepth, ConversionFailure, ConversionResult, ConvertedImage,
    ImageMetadata, MetadataDisplay, Quality, SizePreset, SizeRequest, SourceFormat, SourceImage,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_session_from_config() {
        let config = Config::default();
        let session = ConversionSession::new(config.limits.clone(), std::sync::Arc::new(NullSink));
        let result = session.process(Vec::new(), "", &config.default_size(), config.default_quality());
        assert!(!result.is_success());
        assert!(result.file_name().is_none());
    }
}
