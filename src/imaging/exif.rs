//! Minimal EXIF orientation reader for JPEG files.
//!
//! Extracts a single field: the Orientation tag (`0x0112`) from the APP1
//! `Exif` segment's TIFF IFD0. Cameras store pixels sensor-side-up and record
//! the intended display rotation here; the encoder bakes that rotation into
//! the pixels before resizing so variants never depend on viewer-side EXIF
//! handling.
//!
//! Zero external dependencies — pure Rust, segment walker plus a tiny TIFF
//! IFD scan. Any parse failure means "display as stored", never an error.

use image::DynamicImage;

/// EXIF orientation values 1-8. `Upright` covers value 1 and every
/// missing/unreadable case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Upright,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    fn from_exif_value(value: u16) -> Self {
        match value {
            2 => Self::FlipHorizontal,
            3 => Self::Rotate180,
            4 => Self::FlipVertical,
            5 => Self::Transpose,
            6 => Self::Rotate90,
            7 => Self::Transverse,
            8 => Self::Rotate270,
            _ => Self::Upright,
        }
    }

    /// Whether applying this orientation swaps width and height.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Self::Transpose | Self::Rotate90 | Self::Transverse | Self::Rotate270
        )
    }
}

/// Read the orientation from raw file bytes.
///
/// Only JPEG carries EXIF in this pipeline; PNG and anything unparseable
/// report `Upright`.
pub fn read_orientation(bytes: &[u8]) -> Orientation {
    find_exif_tiff(bytes)
        .and_then(orientation_from_tiff)
        .map(Orientation::from_exif_value)
        .unwrap_or_default()
}

/// Bake an orientation into pixels so downstream resizes see upright data.
pub fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Upright => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90 => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270 => img.rotate270(),
    }
}

const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Walk JPEG segments to the APP1 Exif payload (the embedded TIFF block).
fn find_exif_tiff(data: &[u8]) -> Option<&[u8]> {
    // SOI marker
    if data.len() < 4 || data[0] != 0xFF || data[1] != 0xD8 {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];

        // SOS (image data) or EOI — EXIF must precede both
        if marker == 0xDA || marker == 0xD9 {
            return None;
        }
        // Standalone markers carry no length field
        if marker == 0x01 || (0xD0..=0xD7).contains(&marker) {
            pos += 2;
            continue;
        }

        let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if len < 2 || pos + 2 + len > data.len() {
            return None;
        }
        let segment = &data[pos + 4..pos + 2 + len];

        if marker == 0xE1
            && let Some(tiff) = segment.strip_prefix(EXIF_HEADER)
        {
            return Some(tiff);
        }

        pos += 2 + len;
    }
    None
}

/// Scan TIFF IFD0 for the Orientation tag and return its SHORT value.
fn orientation_from_tiff(tiff: &[u8]) -> Option<u16> {
    if tiff.len() < 8 {
        return None;
    }

    let big_endian = match &tiff[0..2] {
        b"MM" => true,
        b"II" => false,
        _ => return None,
    };

    let read_u16 = |offset: usize| -> Option<u16> {
        let bytes: [u8; 2] = tiff.get(offset..offset + 2)?.try_into().ok()?;
        Some(if big_endian {
            u16::from_be_bytes(bytes)
        } else {
            u16::from_le_bytes(bytes)
        })
    };
    let read_u32 = |offset: usize| -> Option<u32> {
        let bytes: [u8; 4] = tiff.get(offset..offset + 4)?.try_into().ok()?;
        Some(if big_endian {
            u32::from_be_bytes(bytes)
        } else {
            u32::from_le_bytes(bytes)
        })
    };

    if read_u16(2)? != 42 {
        return None;
    }

    let ifd = read_u32(4)? as usize;
    let entry_count = read_u16(ifd)? as usize;

    for i in 0..entry_count {
        // Each entry: tag (2) + type (2) + count (4) + value field (4)
        let entry = ifd + 2 + i * 12;
        if read_u16(entry)? == 0x0112 {
            // SHORT values sit left-justified in the value field
            return read_u16(entry + 8);
        }
    }
    None
}
