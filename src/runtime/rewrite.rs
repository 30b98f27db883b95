//! Responsive rewriting of image nodes.
//!
//! The rewriter's output is a mutation of an [`ImageNode`] — a structured
//! description of an image element: `src`, `srcset`, `sizes`, and an
//! optional format-negotiating wrapper holding alternate-source declarations
//! in preference order. Any rendering target (server-rendered HTML, a
//! virtual DOM, a native image view) can realize the same structure.
//!
//! JPEG is the mandatory fallback format: without at least one JPEG variant
//! the node is left untouched, because a browser that negotiates none of the
//! alternate formats must still have something to load. AVIF is declared
//! before WebP — renderers take the first supported declaration, so the
//! smaller format has to come first for clients that support both.
//!
//! Re-applying the rewriter is safe: previously injected declarations are
//! replaced, manually authored ones survive, and the final structure is the
//! same as after a single application.

use crate::manifest::{ManifestEntry, VariantRef};
use crate::normalize::normalize_source;
use std::collections::BTreeSet;

/// Alternate image format offered ahead of the JPEG fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlternateFormat {
    Avif,
    Webp,
}

impl AlternateFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Avif => "image/avif",
            Self::Webp => "image/webp",
        }
    }
}

/// One alternate-source declaration inside the wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternateSource {
    pub format: AlternateFormat,
    pub srcset: String,
    pub sizes: String,
    /// Whether this pipeline injected the declaration. Manually authored
    /// declarations are never removed or reordered by re-application.
    injected: bool,
}

impl AlternateSource {
    /// A declaration authored by hand in the page markup.
    pub fn authored(format: AlternateFormat, srcset: impl Into<String>, sizes: impl Into<String>) -> Self {
        Self {
            format,
            srcset: srcset.into(),
            sizes: sizes.into(),
            injected: false,
        }
    }

    fn injected(format: AlternateFormat, srcset: String, sizes: String) -> Self {
        Self {
            format,
            srcset,
            sizes,
            injected: true,
        }
    }

    pub fn is_injected(&self) -> bool {
        self.injected
    }
}

/// Format-negotiating container around the base element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureWrapper {
    /// Alternate-source declarations, most-preferred first, all ahead of the
    /// base element.
    pub sources: Vec<AlternateSource>,
}

/// A structured image element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageNode {
    pub src: Option<String>,
    pub srcset: Option<String>,
    pub sizes: Option<String>,
    wrapper: Option<PictureWrapper>,
}

impl ImageNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// An element as authored in the page, before any rewriting.
    pub fn with_src(src: impl Into<String>) -> Self {
        Self {
            src: Some(src.into()),
            ..Self::default()
        }
    }

    pub fn is_wrapped(&self) -> bool {
        self.wrapper.is_some()
    }

    pub fn wrapper(&self) -> Option<&PictureWrapper> {
        self.wrapper.as_ref()
    }

    /// Wrap with manually authored alternate sources (markup that already
    /// carried a container before this pipeline ran).
    pub fn wrap_with_authored(&mut self, sources: Vec<AlternateSource>) {
        self.wrapper = Some(PictureWrapper { sources });
    }

    fn ensure_wrapped(&mut self) -> &mut PictureWrapper {
        self.wrapper.get_or_insert_with(PictureWrapper::default)
    }
}

/// Render a variant list as a `srcset` attribute value.
fn to_srcset(variants: &[VariantRef]) -> String {
    variants
        .iter()
        .map(|v| format!("{} {}w", v.src, v.width))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Copy a variant list sorted ascending by width, dropping blank sources.
fn usable_variants(variants: &[VariantRef]) -> Vec<VariantRef> {
    let mut usable: Vec<VariantRef> = variants
        .iter()
        .filter(|v| !v.src.trim().is_empty())
        .cloned()
        .collect();
    usable.sort_by_key(|v| v.width);
    usable
}

/// Rewrite one image node from a resolved manifest entry.
///
/// Returns whether optimization was applied. `None` entries and entries
/// without JPEG variants leave the node untouched and return `false`.
pub fn apply_responsive_sources(
    node: &mut ImageNode,
    entry: Option<&ManifestEntry>,
    sizes_value: &str,
) -> bool {
    let Some(entry) = entry else {
        return false;
    };

    let jpg = usable_variants(&entry.jpg);
    let Some(smallest) = jpg.first() else {
        return false;
    };

    // Base element: smallest JPEG as plain-src fallback, full list as srcset.
    node.src = Some(smallest.src.clone());
    node.srcset = Some(to_srcset(&jpg));
    node.sizes = Some(sizes_value.to_string());

    let avif = usable_variants(&entry.avif);
    let webp = usable_variants(&entry.webp);
    if avif.is_empty() && webp.is_empty() {
        return true;
    }

    let wrapper = node.ensure_wrapped();
    wrapper.sources.retain(|s| !s.injected);

    // WebP goes after any authored declarations, AVIF ahead of everything.
    if !webp.is_empty() {
        wrapper.sources.push(AlternateSource::injected(
            AlternateFormat::Webp,
            to_srcset(&webp),
            sizes_value.to_string(),
        ));
    }
    if !avif.is_empty() {
        wrapper.sources.insert(
            0,
            AlternateSource::injected(
                AlternateFormat::Avif,
                to_srcset(&avif),
                sizes_value.to_string(),
            ),
        );
    }

    true
}

/// Strip a pre-authored `srcset` whose candidates all point at one asset.
///
/// Listing the same file at several nominal widths is a common authoring
/// mistake; a `sizes` hint left behind without a genuinely responsive
/// `srcset` is worse than neither, so both come off together.
pub fn remove_misleading_srcset(node: &mut ImageNode) {
    let Some(srcset) = node.srcset.as_deref() else {
        return;
    };

    let candidates: Vec<&str> = srcset
        .split(',')
        .filter_map(|entry| entry.trim().split_whitespace().next())
        .filter(|candidate| !candidate.is_empty())
        .collect();
    if candidates.is_empty() {
        return;
    }

    let keys: BTreeSet<String> = candidates
        .iter()
        .map(|candidate| normalize_source(candidate))
        .filter(|key| !key.is_empty())
        .collect();
    if keys.is_empty() {
        return;
    }

    if keys.len() <= 1 {
        node.srcset = None;
        node.sizes = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(width: u32, src: &str) -> VariantRef {
        VariantRef {
            width,
            src: src.to_string(),
        }
    }

    fn full_entry() -> ManifestEntry {
        ManifestEntry {
            width: Some(1000),
            height: Some(750),
            avif: vec![variant(320, "o/a-320.avif"), variant(1000, "o/a-1000.avif")],
            webp: vec![variant(320, "o/a-320.webp"), variant(1000, "o/a-1000.webp")],
            jpg: vec![variant(320, "o/a-320.jpg"), variant(1000, "o/a-1000.jpg")],
        }
    }

    const SIZES: &str = "(max-width: 760px) 50vw, 280px";

    // =========================================================================
    // apply_responsive_sources
    // =========================================================================

    #[test]
    fn none_entry_leaves_node_untouched() {
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        let before = node.clone();
        assert!(!apply_responsive_sources(&mut node, None, SIZES));
        assert_eq!(node, before);
    }

    #[test]
    fn entry_without_jpg_is_refused() {
        let entry = ManifestEntry {
            avif: vec![variant(320, "o/a-320.avif")],
            ..ManifestEntry::default()
        };
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        let before = node.clone();
        assert!(!apply_responsive_sources(&mut node, Some(&entry), SIZES));
        assert_eq!(node, before);
    }

    #[test]
    fn base_element_gets_smallest_jpeg_and_full_srcset() {
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        assert!(apply_responsive_sources(&mut node, Some(&full_entry()), SIZES));

        assert_eq!(node.src.as_deref(), Some("o/a-320.jpg"));
        assert_eq!(
            node.srcset.as_deref(),
            Some("o/a-320.jpg 320w, o/a-1000.jpg 1000w")
        );
        assert_eq!(node.sizes.as_deref(), Some(SIZES));
    }

    #[test]
    fn alternate_sources_avif_before_webp() {
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        apply_responsive_sources(&mut node, Some(&full_entry()), SIZES);

        let sources = &node.wrapper().unwrap().sources;
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].format, AlternateFormat::Avif);
        assert_eq!(sources[1].format, AlternateFormat::Webp);
        assert_eq!(sources[0].srcset, "o/a-320.avif 320w, o/a-1000.avif 1000w");
        assert_eq!(sources[0].sizes, SIZES);
        assert!(sources.iter().all(AlternateSource::is_injected));
    }

    #[test]
    fn jpg_only_entry_never_wraps() {
        let entry = ManifestEntry {
            jpg: vec![variant(320, "o/a-320.jpg")],
            ..ManifestEntry::default()
        };
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        assert!(apply_responsive_sources(&mut node, Some(&entry), SIZES));

        assert!(!node.is_wrapped());
        assert_eq!(node.src.as_deref(), Some("o/a-320.jpg"));
        assert!(node.srcset.is_some());
        assert!(node.sizes.is_some());
    }

    #[test]
    fn webp_only_entry_wraps_with_single_source() {
        let entry = ManifestEntry {
            jpg: vec![variant(320, "o/a-320.jpg")],
            webp: vec![variant(320, "o/a-320.webp")],
            ..ManifestEntry::default()
        };
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        apply_responsive_sources(&mut node, Some(&entry), SIZES);

        let sources = &node.wrapper().unwrap().sources;
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].format, AlternateFormat::Webp);
    }

    #[test]
    fn reapplication_is_idempotent() {
        let entry = full_entry();
        let mut once = ImageNode::with_src("assets/images/a.jpg");
        apply_responsive_sources(&mut once, Some(&entry), SIZES);

        let mut twice = once.clone();
        apply_responsive_sources(&mut twice, Some(&entry), SIZES);

        assert_eq!(once, twice);
        assert_eq!(twice.wrapper().unwrap().sources.len(), 2);
    }

    #[test]
    fn authored_sources_survive_between_avif_and_webp() {
        let entry = full_entry();
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        node.wrap_with_authored(vec![AlternateSource::authored(
            AlternateFormat::Webp,
            "hand-made.webp 500w",
            "100vw",
        )]);

        apply_responsive_sources(&mut node, Some(&entry), SIZES);
        apply_responsive_sources(&mut node, Some(&entry), SIZES);

        let sources = &node.wrapper().unwrap().sources;
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[0].format, AlternateFormat::Avif);
        assert!(sources[0].is_injected());
        assert_eq!(sources[1].srcset, "hand-made.webp 500w");
        assert!(!sources[1].is_injected());
        assert_eq!(sources[2].format, AlternateFormat::Webp);
        assert!(sources[2].is_injected());
    }

    #[test]
    fn unsorted_entry_lists_are_normalized() {
        let entry = ManifestEntry {
            jpg: vec![variant(1000, "o/a-1000.jpg"), variant(320, "o/a-320.jpg")],
            ..ManifestEntry::default()
        };
        let mut node = ImageNode::new();
        apply_responsive_sources(&mut node, Some(&entry), SIZES);

        assert_eq!(node.src.as_deref(), Some("o/a-320.jpg"));
        assert_eq!(
            node.srcset.as_deref(),
            Some("o/a-320.jpg 320w, o/a-1000.jpg 1000w")
        );
    }

    // =========================================================================
    // remove_misleading_srcset
    // =========================================================================

    #[test]
    fn same_asset_at_several_widths_is_stripped() {
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        node.srcset = Some(
            "assets/images/a.jpg 320w, ./assets/images/a.jpg 640w, \
             https://site.example/assets/images/a.jpg 1280w"
                .to_string(),
        );
        node.sizes = Some("100vw".to_string());

        remove_misleading_srcset(&mut node);
        assert!(node.srcset.is_none());
        assert!(node.sizes.is_none());
    }

    #[test]
    fn distinct_assets_are_left_alone() {
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        node.srcset =
            Some("assets/images/a-320.jpg 320w, assets/images/a-640.jpg 640w".to_string());
        node.sizes = Some("100vw".to_string());

        remove_misleading_srcset(&mut node);
        assert!(node.srcset.is_some());
        assert!(node.sizes.is_some());
    }

    #[test]
    fn missing_srcset_is_a_no_op() {
        let mut node = ImageNode::with_src("assets/images/a.jpg");
        node.sizes = Some("100vw".to_string());

        remove_misleading_srcset(&mut node);
        assert_eq!(node.sizes.as_deref(), Some("100vw"));
    }

    #[test]
    fn whitespace_only_srcset_is_left_alone() {
        let mut node = ImageNode::new();
        node.srcset = Some("   ".to_string());
        remove_misleading_srcset(&mut node);
        assert!(node.srcset.is_some());
    }

    #[test]
    fn encoded_spellings_of_one_asset_are_stripped() {
        let mut node = ImageNode::new();
        node.srcset = Some(
            "assets/images/a%20b.jpg 320w, ./assets/images/a%20b.jpg 640w".to_string(),
        );
        node.sizes = Some("100vw".to_string());

        remove_misleading_srcset(&mut node);
        assert!(node.srcset.is_none());
        assert!(node.sizes.is_none());
    }
}
