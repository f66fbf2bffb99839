//! The `webpress save` command for WebP bytes converted elsewhere.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use webpress_core::{decode_data_url, Config, ConversionSession, FsAssetStore, TracingSink};

/// Arguments for the `save` command.
#[derive(Args, Debug)]
pub struct SaveArgs {
    /// A .webp file, or a text file holding a `data:image/webp;base64,` URL
    #[arg(required = true)]
    pub input: PathBuf,

    /// Asset title (defaults to a timestamped title)
    #[arg(short, long)]
    pub title: Option<String>,
}

/// Execute the save command.
pub async fn execute(args: SaveArgs, config: &Config) -> anyhow::Result<()> {
    let raw = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let bytes = webp_payload(raw)?;

    let session = ConversionSession::new(config.limits.clone(), Arc::new(TracingSink));
    let result = session.inject_converted(bytes);
    let store = FsAssetStore::new(config.storage_dir(), Some(config.storage.base_url.clone()));

    let asset = session.save(&result, args.title.as_deref().unwrap_or(""), &store)?;
    tracing::info!(
        "Saved {} as {} in {}",
        args.input.display(),
        asset.filename,
        store.dir().display()
    );

    super::print_json(&asset, config.output.pretty)
}

/// Raw WebP bytes pass through; anything else is read as a (data URL) base64 payload.
fn webp_payload(raw: Vec<u8>) -> anyhow::Result<Vec<u8>> {
    if raw.len() >= 12 && &raw[..4] == b"RIFF" && &raw[8..12] == b"WEBP" {
        return Ok(raw);
    }
    let text = std::str::from_utf8(&raw).context("Input is neither WebP nor a text data URL")?;
    Ok(decode_data_url(text.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    const WEBP_STUB: &[u8] = b"RIFF\x04\0\0\0WEBPVP8 ";

    #[test]
    fn test_raw_webp_passes_through() {
        assert_eq!(webp_payload(WEBP_STUB.to_vec()).unwrap(), WEBP_STUB);
    }

    #[test]
    fn test_data_url_is_decoded() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(WEBP_STUB);
        let url = format!("data:image/webp;base64,{encoded}\n");
        assert_eq!(webp_payload(url.into_bytes()).unwrap(), WEBP_STUB);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(webp_payload(vec![0xff, 0xfe, 0x00]).is_err());
        assert!(webp_payload(b"data:image/webp;base64,".to_vec()).is_err());
    }

    #[tokio::test]
    async fn test_execute_stores_asset() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("export.webp");
        std::fs::write(&input, WEBP_STUB).unwrap();

        let mut config = Config::default();
        config.storage.dir = dir.path().join("uploads");
        config.storage.base_url = "https://media.example.com".into();

        execute(
            SaveArgs {
                input,
                title: Some("Hero Banner".into()),
            },
            &config,
        )
        .await
        .unwrap();

        let stored = std::fs::read(dir.path().join("uploads/hero-banner.webp")).unwrap();
        assert_eq!(stored, WEBP_STUB);
    }
}
