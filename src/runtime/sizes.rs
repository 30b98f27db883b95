//! Layout-context `sizes` rules.
//!
//! The rendered width of an image depends on where it sits in the page, not
//! on the image itself: a hero-collage panel spans half the viewport on
//! tablets, a gallery tile a third on desktops, a social preview a fixed
//! 124px column. Each known layout context carries the media-condition
//! string the browser needs to pick a srcset candidate before layout.
//!
//! Contexts are detected from structural class hints — the element's own
//! classes plus those of its ancestors — mirroring how the page's stylesheet
//! targets the same slots.

/// A known image slot in the page layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutContext {
    HeroCollage,
    GalleryTile,
    SocialPreview,
    Card,
}

/// Structural position of an image element, as class hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralHints<'a> {
    /// Classes on the image element itself.
    pub classes: &'a [&'a str],
    /// Classes on any ancestor element.
    pub ancestor_classes: &'a [&'a str],
}

impl LayoutContext {
    /// The `sizes` attribute value for this context.
    pub fn sizes(self) -> &'static str {
        match self {
            Self::HeroCollage => {
                "(max-width: 420px) 92vw, (max-width: 760px) 46vw, (max-width: 1080px) 50vw, 32vw"
            }
            Self::GalleryTile => {
                "(max-width: 520px) 100vw, (max-width: 760px) 50vw, (max-width: 1200px) 33vw, 280px"
            }
            Self::SocialPreview => "(max-width: 760px) 30vw, 124px",
            Self::Card => "(max-width: 960px) 100vw, 44vw",
        }
    }

    /// Match an element against the known slots. First match wins; images
    /// outside every known slot (brand marks, inline icons) get no `sizes`
    /// hint and are left unoptimized.
    pub fn detect(hints: &StructuralHints<'_>) -> Option<Self> {
        let in_ancestor = |class: &str| hints.ancestor_classes.contains(&class);
        let on_element = |class: &str| hints.classes.contains(&class);

        if in_ancestor("hero-collage") {
            Some(Self::HeroCollage)
        } else if in_ancestor("gallery-tile") || in_ancestor("image-card") {
            Some(Self::GalleryTile)
        } else if in_ancestor("social-preview-grid") {
            Some(Self::SocialPreview)
        } else if in_ancestor("path-card") || on_element("about-photo") {
            Some(Self::Card)
        } else {
            None
        }
    }
}
