//! Image identification and variant encoding — pure Rust, zero external
//! dependencies.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image` header read + in-tree EXIF orientation |
//! | **Resize** | Lanczos3, fit-inside, never enlarging |
//! | **Encode JPEG** | `image` crate, quality 80 |
//! | **Encode WebP** | `webp` crate (lossy), quality 80 |
//! | **Encode AVIF** | `image` crate (rav1e), quality 56 |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing encode operations
//! - **Exif**: Orientation extraction and pixel-level correction
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
pub(crate) mod exif;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::fit_width_dimensions;
pub use params::{EncodeParams, FormatQualities, Quality, VariantFormat};
pub use rust_backend::RustBackend;
