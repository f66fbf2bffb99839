//! JSON reports for conversion results.
//!
//! A [`ConversionReport`] is the display view of a [`ConversionResult`]: the
//! same before/after records a UI would show. Image bytes only appear as
//! `data:` URLs, and only when asked for.

use serde::Serialize;
use std::io::{self, Write};

use crate::store::AssetRef;
use crate::types::{ConversionFailure, ConversionResult, MetadataDisplay};

/// Serializable summary of one conversion.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ConversionFailure>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<MetadataDisplay>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted: Option<MetadataDisplay>,

    /// Where the converted file was written, if anywhere
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    /// Inline `data:` URLs of both images, if requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_data_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_data_url: Option<String>,

    /// Asset store reference, if the result was saved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<AssetRef>,
}

impl ConversionReport {
    pub fn from_result(result: &ConversionResult) -> Self {
        Self {
            file_name: result.file_name().map(str::to_string),
            success: result.is_success(),
            error: result.error().cloned(),
            original: result.original_metadata().map(|m| m.display()),
            converted: result.converted_metadata().map(|m| m.display()),
            output_path: None,
            original_data_url: None,
            converted_data_url: None,
            asset: None,
        }
    }

    /// Embed both images as `data:` URLs, for previews.
    pub fn with_data_urls(mut self, result: &ConversionResult) -> Self {
        self.original_data_url = result.original_data_url();
        self.converted_data_url = result.converted_data_url();
        self
    }

    pub fn with_output_path(mut self, path: impl Into<String>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_asset(mut self, asset: AssetRef) -> Self {
        self.asset = Some(asset);
        self
    }
}

/// A writer that serializes items as JSON, one document per call.
pub struct OutputWriter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> OutputWriter<W> {
    /// Create a new output writer.
    ///
    /// # Arguments
    ///
    /// * `writer` - The underlying writer (file, stdout, etc.)
    /// * `pretty` - Whether to pretty-print JSON
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    /// Write a single item followed by a newline.
    pub fn write<T: Serialize>(&mut self, item: &T) -> io::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, item).map_err(io::Error::other)?;
        } else {
            serde_json::to_writer(&mut self.writer, item).map_err(io::Error::other)?;
        }
        writeln!(self.writer)
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConversionError;

    #[test]
    fn test_report_for_failure_has_no_metadata() {
        let err = ConversionError::UnsupportedFormat {
            mime: "text/plain".into(),
        };
        let result = ConversionResult::failed("notes.txt", &err);
        let report = ConversionReport::from_result(&result);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["kind"], "unsupported_format");
        assert!(json.get("original").is_none());
        assert!(json.get("converted").is_none());
    }

    #[test]
    fn test_write_compact_and_pretty() {
        let report = ConversionReport::from_result(&ConversionResult::from_converted_bytes(vec![1]))
            .with_output_path("out.webp");

        let mut buffer = Vec::new();
        OutputWriter::new(&mut buffer, false).write(&report).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.contains("\"output_path\":\"out.webp\""));
        assert_eq!(output.lines().count(), 1);

        let mut buffer = Vec::new();
        OutputWriter::new(&mut buffer, true).write(&report).unwrap();
        assert!(String::from_utf8(buffer).unwrap().lines().count() > 1);
    }

    #[test]
    fn test_data_urls_only_when_requested() {
        let result = ConversionResult::from_converted_bytes(b"RIFF....WEBP".to_vec());

        let plain = serde_json::to_value(ConversionReport::from_result(&result)).unwrap();
        assert!(plain.get("converted_data_url").is_none());

        let report = ConversionReport::from_result(&result).with_data_urls(&result);
        assert!(report.original_data_url.is_none());
        assert!(report
            .converted_data_url
            .as_deref()
            .unwrap()
            .starts_with("data:image/webp;base64,"));
    }
}
