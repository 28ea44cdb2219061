//! Input normalization: alpha flattening and Otsu binarization.

use image::GrayImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};

use crate::source::SourceImage;

/// Canonical working images derived from one input.
#[derive(Debug, Clone)]
pub struct NormalizedImages {
    /// Binary image, black arc on white. Used for extraction and as the
    /// drawing base.
    pub processing: GrayImage,
    /// Inverse of `processing` (white arc on black), shown next to the
    /// reconstruction.
    pub comparison: GrayImage,
    /// Otsu level used for binarization.
    pub threshold: u8,
    /// Whether the input carried an alpha channel.
    pub had_alpha: bool,
}

/// Normalize any input layout into the binary processing/comparison pair.
///
/// Transparent inputs are first composited onto white, so a transparent
/// background and an opaque white one produce identical results.
pub fn normalize(src: &SourceImage) -> NormalizedImages {
    let had_alpha = src.has_alpha();
    let gray = if had_alpha {
        tracing::debug!("alpha channel detected; compositing onto white");
        SourceImage::Rgb(src.composite_on_white()).to_luma()
    } else {
        src.to_luma()
    };

    let (processing, threshold) = binarize_otsu(&gray);
    let mut comparison = processing.clone();
    image::imageops::invert(&mut comparison);

    NormalizedImages {
        processing,
        comparison,
        threshold,
        had_alpha,
    }
}

/// Global Otsu binarization. Pixels at or below the level (the dark arc)
/// become 0, brighter pixels become 255.
pub fn binarize_otsu(gray: &GrayImage) -> (GrayImage, u8) {
    let level = otsu_level(gray);
    (threshold(gray, level, ThresholdType::Binary), level)
}
