// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode, bound the dimensions, and re-encode as JPEG.
// Operates on in-memory images using the `image` crate.

use image::DynamicImage;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use packwerk_core::error::PackwerkError;
use tracing::{debug, info, instrument};

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so the
/// source pixels are never modified in place.
///
/// ```ignore
/// let jpeg = ImageProcessor::from_bytes(&bytes)?
///     .fit_within(2048)
///     .to_jpeg_bytes(80)?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Create a processor from raw encoded bytes (JPEG, PNG, GIF, WebP, ...).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self, PackwerkError> {
        let img = image::load_from_memory(data)
            .map_err(|err| PackwerkError::Decode(format!("failed to decode image: {}", err)))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img })
    }

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    // -- Transformations ------------------------------------------------------

    /// Shrink the image so neither side exceeds `max_dimension`, preserving
    /// aspect ratio. The longer side lands exactly on `max_dimension`. Images
    /// already within bounds are returned untouched; nothing is ever upscaled.
    ///
    /// Uses Lanczos3 filtering for high-quality downscaling.
    #[instrument(skip(self))]
    pub fn fit_within(self, max_dimension: u32) -> Self {
        let (width, height) = (self.image.width(), self.image.height());
        let Some((new_w, new_h)) = bounded_dimensions(width, height, max_dimension) else {
            return self;
        };

        info!(
            from_w = width,
            from_h = height,
            new_w,
            new_h,
            "Downscaling image"
        );
        let resized = self
            .image
            .resize_exact(new_w, new_h, FilterType::Lanczos3);
        Self { image: resized }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image as JPEG bytes with the given quality (1-100).
    ///
    /// JPEG carries no alpha channel, so transparency is dropped.
    pub fn to_jpeg_bytes(&self, quality: u8) -> Result<Vec<u8>, PackwerkError> {
        let mut buffer = Vec::new();
        let rgb = self.image.to_rgb8();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
        rgb.write_with_encoder(encoder)
            .map_err(|err| PackwerkError::Encode(format!("JPEG encoding failed: {}", err)))?;
        if buffer.is_empty() {
            return Err(PackwerkError::Encode("encoder produced no output".into()));
        }
        Ok(buffer)
    }
}

/// Target size for an image that exceeds `max_dimension` on either side, or
/// `None` when it already fits.
///
/// The scale factor is `max_dimension / max(width, height)`; the longer side
/// becomes exactly `max_dimension` and the shorter side is rounded, never
/// below one pixel.
pub fn bounded_dimensions(width: u32, height: u32, max_dimension: u32) -> Option<(u32, u32)> {
    if width <= max_dimension && height <= max_dimension {
        return None;
    }
    let scale = max_dimension as f64 / width.max(height) as f64;
    let shrink = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_dimension);
    if width >= height {
        Some((max_dimension, shrink(height)))
    } else {
        Some((shrink(width), max_dimension))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn small_images_keep_their_size() {
        assert_eq!(bounded_dimensions(800, 600, 2048), None);
        assert_eq!(bounded_dimensions(2048, 2048, 2048), None);
    }

    #[test]
    fn landscape_is_bounded_by_width() {
        assert_eq!(bounded_dimensions(4096, 3072, 2048), Some((2048, 1536)));
        assert_eq!(bounded_dimensions(3000, 1000, 2048), Some((2048, 683)));
    }

    #[test]
    fn portrait_is_bounded_by_height() {
        assert_eq!(bounded_dimensions(1000, 4000, 2048), Some((512, 2048)));
    }

    #[test]
    fn square_shrinks_on_both_sides() {
        assert_eq!(bounded_dimensions(5000, 5000, 2048), Some((2048, 2048)));
    }

    #[test]
    fn extreme_aspect_keeps_one_pixel() {
        assert_eq!(bounded_dimensions(100_000, 1, 2048), Some((2048, 1)));
    }

    #[test]
    fn fit_within_resizes_pixels() {
        let processor = ImageProcessor::from_dynamic(gradient(300, 120)).fit_within(100);
        assert_eq!(processor.width(), 100);
        assert_eq!(processor.height(), 40);
    }

    #[test]
    fn jpeg_output_is_decodable() {
        let bytes = ImageProcessor::from_dynamic(gradient(64, 48))
            .to_jpeg_bytes(80)
            .expect("encode");
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&bytes).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = ImageProcessor::from_bytes(b"definitely not an image")
            .err()
            .expect("decode should fail");
        assert!(matches!(err, PackwerkError::Decode(_)));
    }
}
