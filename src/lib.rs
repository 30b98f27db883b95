//! # imgset
//!
//! A responsive-image pipeline for static websites: an offline build stage
//! that turns source rasters into multi-resolution, multi-format variants
//! plus a JSON manifest, and a runtime half that consumes the manifest to
//! rewrite image elements with `srcset`/`sizes` and format negotiation.
//!
//! # Architecture: Build Stage → Manifest → Runtime
//!
//! ```text
//! 1. Build    assets/images/  →  assets/images/optimized/  (variants + manifest.json)
//! 2. Fetch    manifest.json   →  in-memory lookup table    (once per page, fail-open)
//! 3. Rewrite  per <img>       →  src/srcset/sizes + format-negotiating wrapper
//! ```
//!
//! The two halves never talk directly: the manifest file is the whole
//! contract. A site that never runs the build tool — or whose manifest
//! request fails — renders exactly as authored, because the runtime treats
//! every failure as "no optimization available."
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`normalize`] | Canonical manifest keys from any source-string spelling; web-path encoding |
//! | [`widths`] | Breakpoint ladder and per-image width-set selection |
//! | [`imaging`] | Identify + encode: backend trait, pure-Rust backend, EXIF orientation |
//! | [`scan`] | Stage 1 — recursive source discovery with output-dir exclusion |
//! | [`process`] | Stage 2 — drives widths × formats per asset, writes the manifest |
//! | [`manifest`] | Shared data model: typed serialization, lenient runtime parsing |
//! | [`cache`] | Content-addressed encode cache (SHA-256 of source + parameters) |
//! | [`config`] | Optional `imgset.toml` overriding directories, ladder, qualities |
//! | [`output`] | CLI output formatting — pure `format_*` functions + print wrappers |
//! | [`runtime`] | Manifest loader (single-flight), entry resolution, node rewriting |
//!
//! # Design Decisions
//!
//! ## Three Formats, JPEG Mandatory
//!
//! Every variant set is encoded as AVIF, WebP, and JPEG. AVIF and WebP are
//! alternate-source declarations ordered most-efficient-first; JPEG is the
//! base `src`/`srcset` so a client that negotiates neither modern format
//! still gets a working image. An asset without JPEG variants is never
//! rewritten at all.
//!
//! ## Pure-Rust Imaging (No ImageMagick, No sharp)
//!
//! Decoding, orientation correction, resizing, and all three encoders are
//! statically linked: the `image` crate for JPEG/PNG/AVIF, the `webp` crate
//! for lossy WebP, and an in-tree EXIF reader for orientation. One binary,
//! no system dependencies, reproducible everywhere.
//!
//! ## Loud Builds, Silent Runtime
//!
//! The build aborts on the first unreadable image or failed encode — a
//! manifest describing files that were never written would break the site
//! it optimizes. The runtime inverts this completely: every failure path
//! resolves to `None` and the page keeps its authored markup. The visible
//! website must never break because an optimization layer had a bad day.
//!
//! ## Fresh Manifest, Cached Pixels
//!
//! Each run rebuilds `manifest.json` from scratch — no merging with stale
//! state. Encoding, the expensive part, is skipped per-variant when a
//! content-addressed cache proves the output current; `--no-cache` restores
//! strict full regeneration with byte-identical manifest output.

pub mod cache;
pub mod config;
pub mod imaging;
pub mod manifest;
pub mod normalize;
pub mod output;
pub mod process;
pub mod runtime;
pub mod scan;
pub mod widths;
