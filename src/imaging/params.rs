//! Parameter types for encode operations.
//!
//! These structs describe *what* to encode, not *how*. They are the interface
//! between the build pipeline (which decides which variants exist) and the
//! [`backend`](super::backend) (which does the pixel work), so a mock backend
//! can stand in during tests without touching an encoder.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

/// Output format of one encoded variant.
///
/// A closed set: an unsupported format is unrepresentable, so the "fail
/// loudly on a bad format argument" contract holds at compile time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantFormat {
    Jpg,
    Webp,
    Avif,
}

impl VariantFormat {
    /// All formats in the order the build encodes and records them.
    pub const ALL: [VariantFormat; 3] = [Self::Jpg, Self::Webp, Self::Avif];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Webp => "webp",
            Self::Avif => "avif",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Avif => "image/avif",
        }
    }
}

/// Per-format encoding qualities for one build run.
///
/// AVIF's perceptual quality scale differs from JPEG and WebP; 56 produces
/// comparable visual fidelity at a smaller file size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatQualities {
    pub jpg: Quality,
    pub webp: Quality,
    pub avif: Quality,
}

impl FormatQualities {
    pub fn for_format(self, format: VariantFormat) -> Quality {
        match format {
            VariantFormat::Jpg => self.jpg,
            VariantFormat::Webp => self.webp,
            VariantFormat::Avif => self.avif,
        }
    }
}

impl Default for FormatQualities {
    fn default() -> Self {
        Self {
            jpg: Quality::new(80),
            webp: Quality::new(80),
            avif: Quality::new(56),
        }
    }
}

/// Full specification for encoding one variant.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    /// Width constraint; the backend clamps to the source width, so a value
    /// above it degrades to a same-size re-encode rather than an upscale.
    pub target_width: u32,
    pub format: VariantFormat,
    pub quality: Quality,
}
