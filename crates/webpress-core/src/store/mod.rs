//! Persistence gateway: where finished WebP images are kept.
//!
//! The conversion core only knows the [`AssetStore`] trait. Errors coming back
//! from a store are passed through untouched and never retried.

mod fs;

pub use fs::{default_title, FsAssetStore};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Reference to a stored asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Opaque, stable identifier
    pub id: String,
    /// Where the asset can be fetched
    pub url: String,
    pub title: String,
    pub filename: String,
}

/// An asset store that accepts finished WebP bytes.
pub trait AssetStore: Send + Sync {
    /// Store `bytes` under a filename derived from `title`.
    ///
    /// A blank title gets a timestamped default. Empty `bytes` fail with
    /// [`StoreError::NoImageAvailable`].
    fn store(&self, bytes: &[u8], title: &str) -> Result<AssetRef, StoreError>;
}
