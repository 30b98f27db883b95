//! Manifest data model shared by the build and runtime stages.
//!
//! The build stage serializes a [`Manifest`] as pretty-printed JSON with a
//! trailing newline; the runtime fetches the same document back and parses
//! it *leniently* — a hand-edited or partially corrupt manifest should
//! degrade to fewer optimized images, never to a page-visible failure.
//!
//! Wire shape:
//!
//! ```text
//! {
//!   "generatedAt": "2026-02-11T09:30:00+00:00",
//!   "widths": [320, 480, 768, 1024, 1400],
//!   "images": {
//!     "assets/images/hero.jpg": {
//!       "width": 1400, "height": 900,
//!       "avif": [{"width": 320, "src": "assets/images/optimized/hero-320.avif"}, ...],
//!       "webp": [...],
//!       "jpg":  [...]
//!     }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One encoded output referenced from the manifest: a web-servable
/// (URI-encoded) path and the pixel width it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantRef {
    pub width: u32,
    pub src: String,
}

/// Per-asset record: intrinsic dimensions plus one variant list per format,
/// each ascending by width.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub avif: Vec<VariantRef>,
    #[serde(default)]
    pub webp: Vec<VariantRef>,
    #[serde(default)]
    pub jpg: Vec<VariantRef>,
}

/// Lookup table keyed by normalized manifest keys.
pub type ManifestImages = BTreeMap<String, ManifestEntry>;

/// The full build-stage document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// ISO-8601 generation timestamp.
    pub generated_at: String,
    /// Breakpoint ladder the build used.
    pub widths: Vec<u32>,
    pub images: ManifestImages,
}

impl Manifest {
    /// Serialize for disk: pretty-printed with a trailing newline.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Parse a fetched payload into the runtime lookup table.
///
/// Returns `None` unless the payload is an object carrying an `images`
/// object — the shape contract with the build stage. Individual entries and
/// variant items are converted tolerantly: anything malformed is dropped in
/// place and the rest survives, and every variant list comes out sorted
/// ascending by width.
pub fn parse_runtime_payload(payload: &Value) -> Option<ManifestImages> {
    let images = payload.get("images")?.as_object()?;

    let mut parsed = ManifestImages::new();
    for (key, value) in images {
        if let Some(entry) = parse_entry(value) {
            parsed.insert(key.clone(), entry);
        }
    }
    Some(parsed)
}

fn parse_entry(value: &Value) -> Option<ManifestEntry> {
    let entry = value.as_object()?;
    Some(ManifestEntry {
        width: entry.get("width").and_then(dimension),
        height: entry.get("height").and_then(dimension),
        avif: parse_variants(entry.get("avif")),
        webp: parse_variants(entry.get("webp")),
        jpg: parse_variants(entry.get("jpg")),
    })
}

fn dimension(value: &Value) -> Option<u32> {
    let number = value.as_f64()?;
    (number.is_finite() && number > 0.0).then(|| number.round() as u32)
}

/// Convert one variant list, dropping items without a usable `src`/`width`
/// and sorting the survivors ascending.
fn parse_variants(value: Option<&Value>) -> Vec<VariantRef> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    let mut variants: Vec<VariantRef> = items
        .iter()
        .filter_map(|item| {
            let src = item.get("src")?.as_str()?;
            if src.trim().is_empty() {
                return None;
            }
            let width = item.get("width").and_then(dimension)?;
            Some(VariantRef {
                width,
                src: src.to_string(),
            })
        })
        .collect();

    variants.sort_by_key(|v| v.width);
    variants
}
