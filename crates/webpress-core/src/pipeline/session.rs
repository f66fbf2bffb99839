//! Conversion session - drives one request through the pipeline.

use std::sync::Arc;
use std::time::Instant;

use super::codec;
use super::metadata::MetadataExtractor;
use super::resolve::resolve;
use super::validate::Validator;
use crate::config::LimitsConfig;
use crate::error::{ConversionError, PipelineResult};
use crate::events::{Event, EventSink, TracingSink};
use crate::store::{AssetRef, AssetStore};
use crate::types::{ConversionResult, Quality, SizeRequest, WEBP_MIME};

/// Runs conversions and hands results to a persistence gateway.
///
/// Holds no per-request state: every [`process`](Self::process) call builds
/// and returns its own [`ConversionResult`], so one session can serve any
/// number of independent requests.
pub struct ConversionSession {
    validator: Validator,
    sink: Arc<dyn EventSink>,
}

impl ConversionSession {
    /// Create a session with the given limits and observability sink.
    pub fn new(limits: LimitsConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            validator: Validator::new(limits),
            sink,
        }
    }

    /// Default limits, events forwarded to `tracing`.
    pub fn with_defaults() -> Self {
        Self::new(LimitsConfig::default(), Arc::new(TracingSink))
    }

    /// Convert one upload.
    ///
    /// Never fails outright: errors are recorded on the returned result, which
    /// then carries nothing but the error descriptor.
    pub fn process(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        size: &SizeRequest,
        quality: Quality,
    ) -> ConversionResult {
        let start = Instant::now();
        self.sink.emit(
            Event::info("Conversion started")
                .with("file", file_name)
                .with("bytes", bytes.len())
                .with("size", size)
                .with("quality", quality.value()),
        );

        match self.run(bytes, file_name, size, quality) {
            Ok(result) => {
                let elapsed = start.elapsed();
                if let Some(meta) = result.converted_metadata() {
                    self.sink.emit(
                        Event::info("Conversion finished")
                            .with("file", file_name)
                            .with("dimensions", meta.dimensions_label())
                            .with("size_kb", meta.size_kb)
                            .with("elapsed_ms", elapsed.as_millis()),
                    );
                }
                tracing::debug!("Converted {:?} in {:?}", file_name, elapsed);
                result
            }
            Err(err) => {
                self.sink.emit(
                    Event::error("Conversion failed")
                        .with("file", file_name)
                        .with("kind", err.kind())
                        .with("error", &err),
                );
                ConversionResult::failed(file_name, &err)
            }
        }
    }

    fn run(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        size: &SizeRequest,
        quality: Quality,
    ) -> PipelineResult<ConversionResult> {
        // Validation happens before any pixel work
        let validate_start = Instant::now();
        let source = self.validator.validate(bytes)?;
        self.sink.emit(
            Event::debug("Source validated")
                .with("mime", source.mime())
                .with("width", source.width())
                .with("height", source.height())
                .with("bits", source.bit_depth())
                .with("alpha", source.has_alpha()),
        );
        let target = resolve(size)?;
        self.validator.check_target(target)?;
        tracing::trace!("  Validate: {:?}", validate_start.elapsed());

        let original_meta = MetadataExtractor::describe(
            source.bytes(),
            source.mime(),
            source.width(),
            source.height(),
            source.bit_depth(),
            None,
        )?;

        let converted = codec::convert(&source, target, quality)?;

        // Bit depth is reported from the source decoder for both records.
        let converted_meta = MetadataExtractor::describe(
            &converted.bytes,
            WEBP_MIME,
            converted.width,
            converted.height,
            source.bit_depth(),
            Some(converted.quality),
        )?;

        Ok(ConversionResult::succeeded(
            file_name,
            source.into_bytes(),
            original_meta,
            converted.bytes,
            converted_meta,
        ))
    }

    /// Wrap externally produced WebP bytes for the persistence hand-off.
    ///
    /// Bypasses the pipeline entirely; the bytes are not validated.
    pub fn inject_converted(&self, bytes: Vec<u8>) -> ConversionResult {
        self.sink
            .emit(Event::debug("Converted bytes injected").with("bytes", bytes.len()));
        ConversionResult::from_converted_bytes(bytes)
    }

    /// Persist the converted bytes of `result`.
    ///
    /// Store errors are returned as `PersistenceFailure` with the store's own
    /// error inside.
    pub fn save(
        &self,
        result: &ConversionResult,
        title: &str,
        store: &dyn AssetStore,
    ) -> PipelineResult<AssetRef> {
        let bytes = match result.converted_bytes() {
            Some(b) if !b.is_empty() => b,
            _ => {
                self.sink
                    .emit(Event::warn("Save requested without a converted image"));
                return Err(ConversionError::NoImageAvailable);
            }
        };

        match store.store(bytes, title) {
            Ok(asset) => {
                self.sink.emit(
                    Event::info("Image saved")
                        .with("id", &asset.id)
                        .with("url", &asset.url)
                        .with("filename", &asset.filename),
                );
                Ok(asset)
            }
            Err(e) => {
                self.sink
                    .emit(Event::error("Image save failed").with("error", &e));
                Err(ConversionError::PersistenceFailure(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, StoreError};
    use crate::events::{EventLevel, RecordingSink};
    use crate::pipeline::test_images;
    use crate::store::FsAssetStore;
    use crate::types::{BitDepth, SizePreset};

    fn session() -> (ConversionSession, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let session = ConversionSession::new(LimitsConfig::default(), sink.clone());
        (session, sink)
    }

    struct FailingStore;

    impl AssetStore for FailingStore {
        fn store(&self, _bytes: &[u8], _title: &str) -> Result<AssetRef, StoreError> {
            Err(StoreError::Backend("quota exceeded".into()))
        }
    }

    #[test]
    fn test_jpeg_to_gallery_end_to_end() {
        let (session, sink) = session();
        let bytes = test_images::jpeg(800, 600);
        let len = bytes.len();

        let result = session.process(
            bytes,
            "landscape.jpg",
            &SizeRequest::Preset(SizePreset::Gallery),
            Quality::new(80),
        );

        assert!(result.is_success(), "{}", result.error_message());
        assert_eq!(result.error_message(), "");

        let original = result.original_metadata().unwrap();
        assert_eq!(original.mime_type, "image/jpeg");
        assert_eq!(original.dimensions_label(), "800 × 600");
        assert_eq!(original.aspect_ratio, 1.33);
        assert_eq!(original.bit_depth, BitDepth::Known(8));
        assert_eq!(original.quality, None);
        assert_eq!(result.original_bytes().unwrap().len(), len);

        let converted = result.converted_metadata().unwrap();
        assert_eq!(converted.dimensions_label(), "150 × 150");
        assert_eq!(converted.aspect_ratio, 1.0);
        assert_eq!(converted.mime_type, "image/webp");
        assert_eq!(converted.quality_label().as_deref(), Some("80%"));
        let converted_len = result.converted_bytes().unwrap().len() as f64;
        assert_eq!(
            converted.size_kb,
            (converted_len / 1024.0 * 100.0).round() / 100.0
        );

        assert_eq!(result.suggested_title().as_deref(), Some("landscape-webp"));
        let messages = sink.messages();
        assert_eq!(messages.first().map(String::as_str), Some("Conversion started"));
        assert_eq!(messages.last().map(String::as_str), Some("Conversion finished"));
    }

    #[test]
    fn test_unsupported_input_records_only_error() {
        let (session, sink) = session();
        let result = session.process(
            b"plain text, not an image".to_vec(),
            "notes.txt",
            &SizeRequest::default(),
            Quality::default(),
        );

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().kind, ErrorKind::UnsupportedFormat);
        assert!(!result.error_message().is_empty());
        assert!(result.original_metadata().is_none());
        assert!(result.converted_metadata().is_none());
        assert!(result.original_bytes().is_none());
        assert!(result.converted_bytes().is_none());

        let failure = sink
            .events()
            .into_iter()
            .find(|e| e.level == EventLevel::Error)
            .unwrap();
        assert_eq!(failure.field("kind"), Some("unsupported_format"));
    }

    #[test]
    fn test_invalid_dimensions_short_circuit() {
        let (session, _) = session();
        let result = session.process(
            test_images::png_rgb(10, 10),
            "square.png",
            &SizeRequest::Custom {
                width: 0,
                height: 100,
            },
            Quality::default(),
        );
        assert_eq!(result.error().unwrap().kind, ErrorKind::InvalidDimensions);
        assert!(result.converted_bytes().is_none());
        assert!(result.original_metadata().is_none());
    }

    #[test]
    fn test_oversized_target_rejected_before_decode() {
        let (session, sink) = session();
        let result = session.process(
            test_images::png_rgb(10, 10),
            "tiny.png",
            &SizeRequest::Custom {
                width: 16383,
                height: 16383,
            },
            Quality::default(),
        );
        assert_eq!(result.error().unwrap().kind, ErrorKind::LimitExceeded);
        assert!(result.converted_bytes().is_none());
        assert!(result.original_metadata().is_none());

        let failure = sink
            .events()
            .into_iter()
            .find(|e| e.level == EventLevel::Error)
            .unwrap();
        assert_eq!(failure.field("kind"), Some("limit_exceeded"));
    }

    #[test]
    fn test_custom_size_stretches() {
        let (session, sink) = session();
        let result = session.process(
            test_images::png_rgba(40, 40),
            "logo.png",
            &SizeRequest::Custom {
                width: 90,
                height: 30,
            },
            Quality::new(60),
        );
        let converted = result.converted_metadata().unwrap();
        assert_eq!(converted.dimensions(), (90, 30));
        assert_eq!(converted.aspect_ratio, 3.0);
        assert_eq!(result.original_metadata().unwrap().aspect_ratio, 1.0);

        let validated = sink
            .events()
            .into_iter()
            .find(|e| e.message == "Source validated")
            .unwrap();
        assert_eq!(validated.field("mime"), Some("image/png"));
        assert_eq!(validated.field("alpha"), Some("true"));
    }

    #[test]
    fn test_sessions_do_not_share_results() {
        let (session, _) = session();
        let ok = session.process(
            test_images::png_rgb(12, 12),
            "a.png",
            &SizeRequest::Preset(SizePreset::Gallery),
            Quality::default(),
        );
        let failed = session.process(
            Vec::new(),
            "b.png",
            &SizeRequest::Preset(SizePreset::Gallery),
            Quality::default(),
        );
        assert!(ok.is_success());
        assert!(!failed.is_success());
        assert!(failed.converted_bytes().is_none());
    }

    #[test]
    fn test_save_injected_bytes() {
        let (session, sink) = session();
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path(), None);

        let result = session.inject_converted(b"RIFF\0\0\0\0WEBPVP8 ".to_vec());
        let asset = session.save(&result, "client upload", &store).unwrap();
        assert_eq!(asset.filename, "client-upload.webp");
        assert!(dir.path().join("client-upload.webp").exists());
        assert!(sink.messages().contains(&"Image saved".to_string()));
    }

    #[test]
    fn test_save_without_image_fails() {
        let (session, _) = session();
        let dir = tempfile::tempdir().unwrap();
        let store = FsAssetStore::new(dir.path(), None);

        let failed = session.process(
            Vec::new(),
            "empty.png",
            &SizeRequest::default(),
            Quality::default(),
        );
        let err = session.save(&failed, "", &store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoImageAvailable);

        let empty = session.inject_converted(Vec::new());
        let err = session.save(&empty, "", &store).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoImageAvailable);
    }

    #[test]
    fn test_store_reporting_no_image_keeps_kind() {
        struct EmptyStore;

        impl AssetStore for EmptyStore {
            fn store(&self, _bytes: &[u8], _title: &str) -> Result<AssetRef, StoreError> {
                Err(StoreError::NoImageAvailable)
            }
        }

        let (session, _) = session();
        let result = session.inject_converted(vec![1, 2, 3]);
        let err = session.save(&result, "x", &EmptyStore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NoImageAvailable);
    }

    #[test]
    fn test_store_errors_pass_through() {
        let (session, sink) = session();
        let result = session.inject_converted(vec![1, 2, 3]);
        let err = session.save(&result, "x", &FailingStore).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
        assert!(matches!(
            err,
            ConversionError::PersistenceFailure(StoreError::Backend(ref m)) if m == "quota exceeded"
        ));
        assert!(sink.messages().contains(&"Image save failed".to_string()));
    }
}
