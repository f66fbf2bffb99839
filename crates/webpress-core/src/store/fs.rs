//! Directory-backed asset store.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::{AssetRef, AssetStore};
use crate::error::StoreError;

/// Fallback stem when a title slugifies to nothing.
const FALLBACK_STEM: &str = "webp-conversion";

/// Number of hex characters of the BLAKE3 content hash used as the asset id.
const ID_LEN: usize = 16;

/// Stores assets as `.webp` files in a single directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    dir: PathBuf,
    base_url: Option<String>,
}

impl FsAssetStore {
    /// Create a store rooted at `dir`.
    ///
    /// With a `base_url`, asset URLs are `base_url/filename`; without one they
    /// are `file://` URLs of the written path.
    pub fn new(dir: impl Into<PathBuf>, base_url: Option<String>) -> Self {
        let base_url = base_url
            .map(|u| u.trim_end_matches('/').to_string())
            .filter(|u| !u.is_empty());
        Self {
            dir: dir.into(),
            base_url,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn url_for(&self, filename: &str, path: &Path) -> String {
        match &self.base_url {
            Some(base) => format!("{base}/{filename}"),
            None => {
                let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
                format!("file://{}", absolute.display())
            }
        }
    }
}

impl AssetStore for FsAssetStore {
    fn store(&self, bytes: &[u8], title: &str) -> Result<AssetRef, StoreError> {
        if bytes.is_empty() {
            return Err(StoreError::NoImageAvailable);
        }

        let title = match title.trim() {
            "" => default_title(),
            t => t.to_string(),
        };

        std::fs::create_dir_all(&self.dir)?;
        let (filename, mut file) = create_unique(&self.dir, &sanitize_stem(&title))?;
        let path = self.dir.join(&filename);

        if let Err(e) = file.write_all(bytes) {
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(e.into());
        }

        tracing::debug!("Stored {} ({} bytes)", path.display(), bytes.len());

        Ok(AssetRef {
            id: content_id(bytes),
            url: self.url_for(&filename, &path),
            title,
            filename,
        })
    }
}

/// `WebP Conversion 2026-10-17 09:30:00`
pub fn default_title() -> String {
    format!(
        "WebP Conversion {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )
}

/// Filesystem-safe stem for a title.
fn sanitize_stem(title: &str) -> String {
    let stem = slug::slugify(title);
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

/// Claim the first free name among `stem.webp`, `stem-1.webp`, `stem-2.webp`, ...
///
/// The file is created with `create_new`, so a name is only ever handed to
/// one writer even when several stores race on the same title.
fn create_unique(dir: &Path, stem: &str) -> Result<(String, File), StoreError> {
    let mut n = 0u32;
    loop {
        let candidate = match n {
            0 => format!("{stem}.webp"),
            n => format!("{stem}-{n}.webp"),
        };
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(dir.join(&candidate))
        {
            Ok(file) => return Ok((candidate, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err(e.into()),
        }
    }
}

fn content_id(bytes: &[u8]) -> String {
    let hash = blake3::hash(bytes).to_hex();
    hash.as_str()[..ID_LEN].to_string()
}
