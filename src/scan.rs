//! Source-asset discovery.
//!
//! Stage 1 of the build pipeline: walk the source tree, keep supported
//! raster files, exclude anything already inside the output directory (so
//! repeated runs against the same tree never re-ingest their own variants),
//! and read intrinsic dimensions for each survivor.
//!
//! Discovery order is deterministic — assets come back sorted by relative
//! path — so manifests and log output are stable across runs and platforms.

use crate::imaging::{BackendError, ImageBackend};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source directory not found: {0}")]
    SourceRootMissing(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Image error: {0}")]
    Imaging(#[from] BackendError),
}

/// Raster extensions the pipeline accepts (case-insensitive).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// A discovered source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceAsset {
    /// Filesystem path as walked.
    pub path: PathBuf,
    /// Path relative to the source root, POSIX-separated. Asset identity.
    pub rel: String,
    /// Intrinsic display width (orientation applied).
    pub width: u32,
    pub height: u32,
}

/// Enumerate all processable source images under `source_root`.
///
/// A missing source root is fatal; an unreadable or corrupt image is too —
/// a build that silently skipped assets would publish an incomplete
/// manifest.
pub fn discover(
    backend: &impl ImageBackend,
    source_root: &Path,
    output_root: &Path,
) -> Result<Vec<SourceAsset>, ScanError> {
    if !source_root.is_dir() {
        return Err(ScanError::SourceRootMissing(source_root.to_path_buf()));
    }

    let mut assets = Vec::new();
    for entry in WalkDir::new(source_root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.starts_with(output_root) || !has_supported_extension(path) {
            continue;
        }
        let Ok(rel_path) = path.strip_prefix(source_root) else {
            continue;
        };

        let dims = backend.identify(path)?;
        assets.push(SourceAsset {
            path: path.to_path_buf(),
            rel: to_posix(rel_path),
            width: dims.width,
            height: dims.height,
        });
    }

    assets.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(assets)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Join path components with forward slashes regardless of platform.
fn to_posix(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
