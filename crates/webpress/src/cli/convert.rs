//! The `webpress convert` command.

use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use webpress_core::{
    Config, ConversionReport, ConversionResult, ConversionSession, FsAssetStore, Quality,
    SizeRequest, TracingSink,
};

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Image file to convert (JPEG, PNG, GIF, BMP or WebP)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Size preset name (e.g. `featured`) or WIDTHxHEIGHT (e.g. `800x600`)
    #[arg(short, long)]
    pub size: Option<SizeRequest>,

    /// Encoding quality 1-100 (out-of-range values are clamped)
    #[arg(short, long, allow_negative_numbers = true)]
    pub quality: Option<i64>,

    /// Where to write the .webp file (defaults to `<input stem>-webp.webp`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Embed both images as data URLs in the report
    #[arg(long)]
    pub data_urls: bool,

    /// Also save the result to the asset store
    #[arg(long)]
    pub save: bool,

    /// Asset title when saving (defaults to `<input stem>-webp`)
    #[arg(long, requires = "save")]
    pub title: Option<String>,
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: &Config) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let file_name = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let size = args.size.unwrap_or_else(|| config.default_size());
    let quality = args
        .quality
        .map(|q| Quality::from_option(Some(q)))
        .unwrap_or_else(|| config.default_quality());

    tracing::info!("Converting {:?} to {} at {}", args.input, size, quality);

    let session = Arc::new(ConversionSession::new(
        config.limits.clone(),
        Arc::new(TracingSink),
    ));
    let result = run_conversion(
        Arc::clone(&session),
        bytes,
        file_name,
        size,
        quality,
        config.limits.convert_timeout_ms,
    )
    .await?;

    let mut report = ConversionReport::from_result(&result);
    if args.data_urls {
        report = report.with_data_urls(&result);
    }
    let Some(converted) = result.converted_bytes() else {
        super::print_json(&report, config.output.pretty)?;
        anyhow::bail!("Conversion failed: {}", result.error_message());
    };

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    super::write_file(&output, converted)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    report = report.with_output_path(output.display().to_string());

    if args.save {
        let store = FsAssetStore::new(config.storage_dir(), Some(config.storage.base_url.clone()));
        let title = args
            .title
            .or_else(|| result.suggested_title())
            .unwrap_or_default();
        let asset = session.save(&result, &title, &store)?;
        tracing::info!("Saved {} to {}", asset.filename, store.dir().display());
        report = report.with_asset(asset);
    }

    super::print_json(&report, config.output.pretty)
}

/// Run the CPU-bound conversion off the async runtime, bounded by `timeout_ms`.
async fn run_conversion(
    session: Arc<ConversionSession>,
    bytes: Vec<u8>,
    file_name: String,
    size: SizeRequest,
    quality: Quality,
    timeout_ms: u64,
) -> anyhow::Result<ConversionResult> {
    let task =
        tokio::task::spawn_blocking(move || session.process(bytes, &file_name, &size, quality));

    match tokio::time::timeout(Duration::from_millis(timeout_ms), task).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => anyhow::bail!("Conversion task panicked: {e}"),
        Err(_) => anyhow::bail!("Conversion timed out after {timeout_ms}ms"),
    }
}

/// `photos/cat.jpg` → `photos/cat-webp.webp`
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    input.with_file_name(format!("{stem}-webp.webp"))
}
