//! Pure Rust image processing backend — zero external dependencies.
//!
//! Everything is statically linked into the binary: no ImageMagick, no
//! libvips, no shelling out.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG) | `image` crate (pure Rust decoders) |
//! | Orientation | in-tree [`exif`](super::exif) reader, baked before resize |
//! | Resize | `image::imageops` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → WebP | `webp` crate (lossy; the `image` crate only does lossless) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::fit_width_dimensions;
use super::exif;
use super::params::{EncodeParams, VariantFormat};
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a source image and bake its EXIF orientation into the pixels.
fn decode_oriented(path: &Path) -> Result<DynamicImage, BackendError> {
    let bytes = std::fs::read(path).map_err(BackendError::Io)?;
    let img = image::load_from_memory(&bytes).map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    })?;
    Ok(exif::apply_orientation(img, exif::read_orientation(&bytes)))
}

/// Encode and save as JPEG. JPEG has no alpha channel, so the image is
/// flattened to RGB first.
fn save_jpeg(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

/// Encode and save as lossy WebP. The `webp` encoder accepts RGB8/RGBA8 only.
fn save_webp(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), BackendError> {
    let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
    let encoder = webp::Encoder::from_image(&rgba)
        .map_err(|e| BackendError::ProcessingFailed(format!("WebP encode failed: {}", e)))?;
    let data = encoder.encode(f32::from(quality));
    std::fs::write(path, &*data).map_err(BackendError::Io)
}

/// Encode and save as AVIF using rav1e (speed=6 for reasonable throughput).
fn save_avif(img: &DynamicImage, path: &Path, quality: u8) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(writer, 6, quality);
    img.write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("AVIF encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let bytes = std::fs::read(path).map_err(BackendError::Io)?;
        let reader = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()
            .map_err(BackendError::Io)?;
        let (mut width, mut height) = reader.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;

        // Report display dimensions: a rotated camera shot answers with its
        // upright width, matching what encode produces.
        if exif::read_orientation(&bytes).swaps_dimensions() {
            std::mem::swap(&mut width, &mut height);
        }
        Ok(Dimensions { width, height })
    }

    fn encode(&self, params: &EncodeParams) -> Result<(), BackendError> {
        let img = decode_oriented(&params.source)?;
        let source_dims = (img.width(), img.height());
        let (out_w, out_h) = fit_width_dimensions(source_dims, params.target_width);

        let resized = if (out_w, out_h) == source_dims {
            img
        } else {
            img.resize_exact(out_w, out_h, FilterType::Lanczos3)
        };

        let quality = params.quality.value();
        match params.format {
            VariantFormat::Jpg => save_jpeg(&resized, &params.output, quality),
            VariantFormat::Webp => save_webp(&resized, &params.output, quality),
            VariantFormat::Avif => save_avif(&resized, &params.output, quality),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use image::{ImageEncoder, RgbImage};

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        image::codecs::jpeg::JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// Create a small valid PNG file with the given dimensions.
    fn create_test_png(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, 64, (y % 256) as u8])
        });
        img.save_with_format(path, image::ImageFormat::Png).unwrap();
    }

    /// Splice a synthetic APP1 Exif segment (orientation only) into a JPEG
    /// right after SOI, keeping the file decodable.
    fn with_orientation(jpeg: &[u8], value: u16) -> Vec<u8> {
        let mut tiff = Vec::new();
        tiff.extend_from_slice(b"MM");
        tiff.extend_from_slice(&42u16.to_be_bytes());
        tiff.extend_from_slice(&8u32.to_be_bytes());
        tiff.extend_from_slice(&1u16.to_be_bytes());
        tiff.extend_from_slice(&0x0112u16.to_be_bytes());
        tiff.extend_from_slice(&3u16.to_be_bytes());
        tiff.extend_from_slice(&1u32.to_be_bytes());
        tiff.extend_from_slice(&value.to_be_bytes());
        tiff.extend_from_slice(&[0, 0]);

        let payload_len = 6 + tiff.len() + 2;
        let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
        out.extend_from_slice(&(payload_len as u16).to_be_bytes());
        out.extend_from_slice(b"Exif\0\0");
        out.extend_from_slice(&tiff);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    fn encode_params(
        source: &Path,
        output: &Path,
        target_width: u32,
        format: VariantFormat,
    ) -> EncodeParams {
        EncodeParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            target_width,
            format,
            quality: Quality::new(80),
        }
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_synthetic_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.png");
        create_test_png(&path, 120, 80);

        let backend = RustBackend::new();
        let dims = backend.identify(&path).unwrap();
        assert_eq!(dims.width, 120);
        assert_eq!(dims.height, 80);
    }

    #[test]
    fn identify_swaps_for_rotated_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let plain = tmp.path().join("plain.jpg");
        create_test_jpeg(&plain, 200, 100);

        let rotated = tmp.path().join("rotated.jpg");
        let bytes = std::fs::read(&plain).unwrap();
        std::fs::write(&rotated, with_orientation(&bytes, 6)).unwrap();

        let backend = RustBackend::new();
        let dims = backend.identify(&rotated).unwrap();
        assert_eq!((dims.width, dims.height), (100, 200));
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let backend = RustBackend::new();
        assert!(backend.identify(Path::new("/nonexistent/image.jpg")).is_err());
    }

    #[test]
    fn identify_garbage_bytes_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("junk.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let backend = RustBackend::new();
        assert!(backend.identify(&path).is_err());
    }

    #[test]
    fn encode_jpeg_downscales_to_target() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = tmp.path().join("out-200.jpg");
        let backend = RustBackend::new();
        backend
            .encode(&encode_params(&source, &output, 200, VariantFormat::Jpg))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (200, 150));
    }

    #[test]
    fn encode_clamps_instead_of_upscaling() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 300, 200);

        let output = tmp.path().join("out-800.jpg");
        let backend = RustBackend::new();
        backend
            .encode(&encode_params(&source, &output, 800, VariantFormat::Jpg))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (300, 200));
    }

    #[test]
    fn encode_webp_writes_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 200, 150);

        let output = tmp.path().join("out-100.webp");
        let backend = RustBackend::new();
        backend
            .encode(&encode_params(&source, &output, 100, VariantFormat::Webp))
            .unwrap();

        assert!(output.exists());
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn encode_avif_writes_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 120, 90);

        let output = tmp.path().join("out-64.avif");
        let backend = RustBackend::new();
        backend
            .encode(&encode_params(&source, &output, 64, VariantFormat::Avif))
            .unwrap();

        assert!(output.exists());
        assert!(std::fs::metadata(&output).unwrap().len() > 0);
    }

    #[test]
    fn encode_png_source_with_alpha_to_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        let img = image::RgbaImage::from_fn(100, 80, |x, _| image::Rgba([200, 100, 50, (x % 256) as u8]));
        img.save_with_format(&source, image::ImageFormat::Png).unwrap();

        let output = tmp.path().join("out-50.jpg");
        let backend = RustBackend::new();
        backend
            .encode(&encode_params(&source, &output, 50, VariantFormat::Jpg))
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (50, 40));
    }

    #[test]
    fn encode_bakes_orientation_before_resize() {
        let tmp = tempfile::TempDir::new().unwrap();
        let plain = tmp.path().join("plain.jpg");
        // Stored 200x100; orientation 6 displays as 100x200
        create_test_jpeg(&plain, 200, 100);
        let rotated = tmp.path().join("rotated.jpg");
        let bytes = std::fs::read(&plain).unwrap();
        std::fs::write(&rotated, with_orientation(&bytes, 6)).unwrap();

        let output = tmp.path().join("out-50.jpg");
        let backend = RustBackend::new();
        backend
            .encode(&encode_params(&rotated, &output, 50, VariantFormat::Jpg))
            .unwrap();

        // Width constraint applies to the upright image
        assert_eq!(image::image_dimensions(&output).unwrap(), (50, 100));
    }

    #[test]
    fn encode_corrupt_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("junk.jpg");
        std::fs::write(&source, b"not an image").unwrap();

        let output = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        let result = backend.encode(&encode_params(&source, &output, 100, VariantFormat::Jpg));
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn encode_missing_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("out.jpg");
        let backend = RustBackend::new();
        let result = backend.encode(&encode_params(
            Path::new("/nonexistent/source.jpg"),
            &output,
            100,
            VariantFormat::Jpg,
        ));
        assert!(matches!(result, Err(BackendError::Io(_))));
    }
}
