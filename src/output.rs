//! CLI output formatting for the build pipeline.
//!
//! Each surface has a `format_*` function (returns strings) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure —
//! no I/O, no side effects.
//!
//! ```text
//! assets/images/hero.jpg -> 5 responsive size(s)
//! assets/images/pics/tile.png -> 2 responsive size(s)
//! Processed 2 file(s).
//! Manifest written: assets/images/optimized/manifest.json
//! Cache: 24 cached, 6 encoded (30 total)
//! ```

use crate::cache::CacheStats;
use crate::scan::SourceAsset;
use std::path::Path;

/// One line per processed asset: its manifest key and variant-set size.
pub fn format_asset_line(key: &str, size_count: usize) -> String {
    format!("{} -> {} responsive size(s)", key, size_count)
}

pub fn print_asset_line(key: &str, size_count: usize) {
    println!("{}", format_asset_line(key, size_count));
}

/// End-of-build summary.
pub fn format_build_summary(
    processed: usize,
    manifest_path: &Path,
    cache_stats: &CacheStats,
) -> Vec<String> {
    vec![
        format!("Processed {} file(s).", processed),
        format!("Manifest written: {}", manifest_path.display()),
        format!("Cache: {}", cache_stats),
    ]
}

pub fn print_build_summary(processed: usize, manifest_path: &Path, cache_stats: &CacheStats) {
    for line in format_build_summary(processed, manifest_path, cache_stats) {
        println!("{}", line);
    }
}

/// `check` output: every discovered asset with its dimensions, then a count.
pub fn format_check_output(assets: &[SourceAsset]) -> Vec<String> {
    let mut lines: Vec<String> = assets
        .iter()
        .map(|asset| format!("{} ({}x{})", asset.rel, asset.width, asset.height))
        .collect();
    lines.push(format!("{} source image(s)", assets.len()));
    lines
}

pub fn print_check_output(assets: &[SourceAsset]) {
    for line in format_check_output(assets) {
        println!("{}", line);
    }
}
