//! Error types for the webpress conversion pipeline.
//!
//! Errors are organized by concern: conversion (validation, decode, encode),
//! storage (the asset store behind the persistence gateway), and configuration.
//! Every conversion error maps to a machine-distinguishable [`ErrorKind`] so
//! callers can branch on the kind while still showing the human-readable message.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Machine-distinguishable classification of a conversion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidDimensions,
    DegenerateDimensions,
    UnsupportedFormat,
    DecodeFailure,
    EncodeFailure,
    NoImageAvailable,
    PersistenceFailure,
    LimitExceeded,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::InvalidDimensions => "invalid_dimensions",
            ErrorKind::DegenerateDimensions => "degenerate_dimensions",
            ErrorKind::UnsupportedFormat => "unsupported_format",
            ErrorKind::DecodeFailure => "decode_failure",
            ErrorKind::EncodeFailure => "encode_failure",
            ErrorKind::NoImageAvailable => "no_image_available",
            ErrorKind::PersistenceFailure => "persistence_failure",
            ErrorKind::LimitExceeded => "limit_exceeded",
        };
        f.write_str(s)
    }
}

/// Conversion errors, organized by pipeline stage.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Requested target size is not two positive integers
    #[error("Invalid dimensions {width} × {height}: width and height must be positive")]
    InvalidDimensions { width: i64, height: i64 },

    /// Aspect ratio requested for a zero-height image
    #[error("Degenerate dimensions {width} × {height}: height must be non-zero")]
    DegenerateDimensions { width: u32, height: u32 },

    /// Source is not one of the allowed input formats
    #[error("Uploaded file is not a valid image ({mime})")]
    UnsupportedFormat { mime: String },

    /// Source bytes could not be decoded
    #[error("Failed to decode image: {message}")]
    DecodeFailure { message: String },

    /// Destination canvas could not be encoded as WebP
    #[error("Failed to encode WebP: {message}")]
    EncodeFailure { message: String },

    /// Persistence was requested with no converted bytes
    #[error("No converted image available to save")]
    NoImageAvailable,

    /// The asset store rejected the write
    #[error("Failed to save image: {0}")]
    PersistenceFailure(#[from] StoreError),

    /// Upload exceeds the byte limit
    #[error("File too large: {size_mb}MB > {max_mb}MB")]
    FileTooLarge { size_mb: u64, max_mb: u64 },

    /// Image header reports dimensions above the limit
    #[error("Image too large: {width}x{height} > {max_dim}")]
    ImageTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Requested output size is above the limit
    #[error("Target size too large: {width}x{height} > {max_dim}")]
    TargetTooLarge {
        width: u32,
        height: u32,
        max_dim: u32,
    },
}

impl ConversionError {
    /// The machine-distinguishable kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConversionError::InvalidDimensions { .. } => ErrorKind::InvalidDimensions,
            ConversionError::DegenerateDimensions { .. } => ErrorKind::DegenerateDimensions,
            ConversionError::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            ConversionError::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            ConversionError::EncodeFailure { .. } => ErrorKind::EncodeFailure,
            ConversionError::NoImageAvailable
            | ConversionError::PersistenceFailure(StoreError::NoImageAvailable) => {
                ErrorKind::NoImageAvailable
            }
            ConversionError::PersistenceFailure(_) => ErrorKind::PersistenceFailure,
            ConversionError::FileTooLarge { .. }
            | ConversionError::ImageTooLarge { .. }
            | ConversionError::TargetTooLarge { .. } => ErrorKind::LimitExceeded,
        }
    }
}

/// Asset store errors. Opaque to the conversion core.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Writing the asset to its backing storage failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The store was handed no image bytes
    #[error("No converted image available to save")]
    NoImageAvailable,

    /// Backend-specific failure
    #[error("{0}")]
    Backend(String),
}

/// Convenience type alias for conversion-specific results.
pub type PipelineResult<T> = std::result::Result<T, ConversionError>;
