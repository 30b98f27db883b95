//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the pipeline needs:
//! identify and encode. The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend) — pure Rust, statically
//! linked, no system dependencies. Tests use a mock that records operations
//! instead of touching pixels.

use super::params::EncodeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
///
/// These are *display* dimensions: EXIF orientation is already applied, so a
/// portrait photo stored rotated reports its upright width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image processing backends.
///
/// Both operations must agree on orientation handling: the width reported by
/// `identify` is the width `encode` clamps against.
pub trait ImageBackend: Sync {
    /// Get intrinsic display dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Produce one encoded variant file.
    fn encode(&self, params: &EncodeParams) -> Result<(), BackendError>;
}
