//! Command handlers.

pub mod config;
pub mod convert;
pub mod presets;
pub mod save;

use std::io::Write;

use serde::Serialize;
use webpress_core::OutputWriter;

/// Print one JSON document to stdout.
pub(crate) fn print_json<T: Serialize>(item: &T, pretty: bool) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut writer = OutputWriter::new(stdout.lock(), pretty);
    writer.write(item)?;
    writer.flush()?;
    Ok(())
}

/// Write `bytes` to `path`, creating parent directories.
pub(crate) fn write_file(path: &std::path::Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    Ok(())
}
