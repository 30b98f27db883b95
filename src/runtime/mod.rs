//! Runtime consumer of the build-stage manifest.
//!
//! The page-initialization logic calls into this module once per image
//! element: resolve the element's current source against the manifest
//! ([`loader`]), pick a `sizes` rule from the element's structural position
//! ([`sizes`]), and rewrite the element to serve the best variants
//! ([`rewrite`]).
//!
//! ```text
//! ManifestLoader::images()          fetched once, memoized, fail-open
//!        │
//! resolve_entry(images, src)        decoded key, then encoded fallback
//!        │
//! LayoutContext::detect(hints)      hero collage / gallery tile / ...
//!        │
//! apply_responsive_sources(...)     mutate the structured image node
//! ```
//!
//! Nothing in here can fail from the page's point of view: every miss or
//! malfunction degrades to "the image keeps its authored sources."

pub mod loader;
pub mod rewrite;
pub mod sizes;

pub use loader::{
    DEFAULT_MANIFEST_PATH, HttpTransport, ManifestLoader, ManifestTransport, TransportError,
    TransportResponse, resolve_entry,
};
pub use rewrite::{
    AlternateFormat, AlternateSource, ImageNode, PictureWrapper, apply_responsive_sources,
    remove_misleading_srcset,
};
pub use sizes::{LayoutContext, StructuralHints};
