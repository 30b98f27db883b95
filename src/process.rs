//! Variant generation and manifest building.
//!
//! Stage 2 of the build pipeline. Takes the assets discovered by
//! [`scan`](crate::scan) and, for each one, encodes its full width set in
//! all three output formats, then serializes the manifest that the runtime
//! half of the crate consumes.
//!
//! ## Output Structure
//!
//! ```text
//! assets/images/optimized/
//! ├── manifest.json
//! ├── .cache-manifest.json       # encode cache (see cache module)
//! ├── hero-320.jpg               # one file per width × format
//! ├── hero-320.webp
//! ├── hero-320.avif
//! ├── hero-480.jpg
//! │   ...
//! └── pics/
//!     ├── tile-320.jpg
//!     └── ...
//! ```
//!
//! Output paths mirror the source tree: `pics/tile.png` at width 320 lands
//! at `<output>/pics/tile-320.jpg` and is recorded in the manifest under the
//! key `assets/images/pics/tile.png` with a URI-encoded `src`.
//!
//! ## Failure Model
//!
//! Assets are processed one at a time, every variant of one asset before the
//! next, so log order is stable. The first encode failure aborts the whole
//! run — a manifest describing files that were never written would break the
//! site it is meant to optimize, so no partial manifest is ever published.

use crate::cache::{self, CacheManifest, CacheStats};
use crate::config::BuildConfig;
use crate::imaging::{
    BackendError, EncodeParams, FormatQualities, ImageBackend, Quality, VariantFormat,
};
use crate::manifest::{Manifest, ManifestEntry, ManifestImages, VariantRef};
use crate::normalize::encode_asset_path;
use crate::output;
use crate::scan::{self, ScanError};
use crate::widths::select_widths_from;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Canonical web-root prefix for manifest keys, independent of where the
/// source tree physically lives.
const KEY_PREFIX: &str = "assets/images/";

/// Name of the manifest file within the output directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result of a completed build run.
#[derive(Debug)]
pub struct BuildReport {
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    /// Number of source assets processed.
    pub processed: usize,
    pub cache_stats: CacheStats,
}

/// Run the full build: discover, encode, record, serialize.
///
/// With `use_cache` the content-addressed cache skips encodes whose source
/// bytes and parameters are unchanged; the manifest is rebuilt from scratch
/// either way.
pub fn build(
    backend: &impl ImageBackend,
    config: &BuildConfig,
    use_cache: bool,
) -> Result<BuildReport, BuildError> {
    let source_root = Path::new(&config.source_dir);
    let output_root = Path::new(&config.output_dir);
    let web_root = web_root_prefix(&config.output_dir);
    let qualities = FormatQualities {
        jpg: Quality::new(config.images.jpg_quality),
        webp: Quality::new(config.images.webp_quality),
        avif: Quality::new(config.images.avif_quality),
    };

    let assets = scan::discover(backend, source_root, output_root)?;
    std::fs::create_dir_all(output_root)?;

    let mut cache_manifest = if use_cache {
        CacheManifest::load(output_root)
    } else {
        CacheManifest::empty()
    };
    let mut stats = CacheStats::default();
    let mut images = ManifestImages::new();

    for asset in &assets {
        let widths = select_widths_from(&config.images.widths, asset.width);
        if widths.is_empty() {
            continue;
        }

        let source_hash = if use_cache {
            cache::hash_file(&asset.path)?
        } else {
            String::new()
        };
        let rel_base = strip_extension(&asset.rel);

        let mut entry = ManifestEntry {
            width: Some(asset.width),
            height: Some(asset.height),
            ..Default::default()
        };

        for &width in &widths {
            for format in VariantFormat::ALL {
                let variant_rel = format!("{}-{}.{}", rel_base, width, format.extension());
                let out_path = output_root.join(&variant_rel);
                if let Some(parent) = out_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }

                let quality = qualities.for_format(format);
                let params_hash = cache::hash_encode_params(width, format, quality.value());

                let cached = if use_cache {
                    cache_manifest.find_cached(&source_hash, &params_hash, output_root)
                } else {
                    None
                };
                match cached {
                    Some(stored) if stored == variant_rel => stats.hit(),
                    Some(stored) => {
                        std::fs::copy(output_root.join(&stored), &out_path)?;
                        stats.copy();
                    }
                    None => {
                        backend.encode(&EncodeParams {
                            source: asset.path.clone(),
                            output: out_path,
                            target_width: width,
                            format,
                            quality,
                        })?;
                        stats.miss();
                    }
                }
                if use_cache {
                    cache_manifest.insert(variant_rel.clone(), source_hash.clone(), params_hash);
                }

                let variant = VariantRef {
                    width,
                    src: encode_asset_path(&format!("{}/{}", web_root, variant_rel)),
                };
                match format {
                    VariantFormat::Jpg => entry.jpg.push(variant),
                    VariantFormat::Webp => entry.webp.push(variant),
                    VariantFormat::Avif => entry.avif.push(variant),
                }
            }
        }

        let key = format!("{}{}", KEY_PREFIX, asset.rel);
        output::print_asset_line(&key, widths.len());
        images.insert(key, entry);
    }

    if use_cache {
        cache_manifest.save(output_root)?;
    }

    let manifest = Manifest {
        generated_at: chrono::Utc::now().to_rfc3339(),
        widths: config.images.widths.clone(),
        images,
    };
    let manifest_path = output_root.join(MANIFEST_FILENAME);
    std::fs::write(&manifest_path, manifest.to_json_pretty()?)?;

    Ok(BuildReport {
        manifest,
        manifest_path,
        processed: assets.len(),
        cache_stats: stats,
    })
}

/// Web-path prefix recorded in manifest `src` values, derived from the
/// configured output directory.
fn web_root_prefix(output_dir: &str) -> String {
    let posix = output_dir.replace('\\', "/");
    let trimmed = posix.strip_prefix("./").unwrap_or(&posix);
    trimmed.trim_end_matches('/').to_string()
}

/// Drop the final extension of a POSIX relative path, keeping directories.
fn strip_extension(rel: &str) -> &str {
    match rel.rfind('.') {
        Some(dot) if !rel[dot..].contains('/') => &rel[..dot],
        _ => rel,
    }
}
