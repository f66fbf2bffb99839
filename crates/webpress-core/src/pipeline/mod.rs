//! Image conversion pipeline components.
//!
//! This module contains all the stages of the conversion pipeline:
//! - **validate**: Size limits, format sniffing, header checks
//! - **resolve**: Preset / custom size → target dimensions
//! - **decode**: Header inspection and full decode per source format
//! - **codec**: Canvas preparation, resampling, lossy WebP encoding
//! - **metadata**: Before/after image statistics
//! - **session**: Orchestrates one request end to end

pub mod codec;
pub mod decode;
pub mod metadata;
pub mod resolve;
pub mod session;
pub mod validate;

#[cfg(test)]
pub(crate) mod test_images;

// Re-exports for convenient access
pub use codec::{convert, Canvas};
pub use decode::{decode, inspect, HeaderInfo};
pub use metadata::MetadataExtractor;
pub use resolve::resolve;
pub use session::ConversionSession;
pub use validate::{sniff_mime, Validator};
