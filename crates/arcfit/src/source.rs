//! Input image representation with an explicit channel layout.

use std::path::Path;

use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};

/// Decoded input image, tagged by channel layout.
///
/// 16-bit and float inputs are narrowed to 8 bits per channel on load.
#[derive(Debug, Clone)]
pub enum SourceImage {
    Grayscale(GrayImage),
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl SourceImage {
    /// Decode an image file, keeping the alpha channel when the file has one.
    pub fn open(path: &Path) -> Result<Self, image::ImageError> {
        Ok(Self::from_dynamic(image::open(path)?))
    }

    /// Pick the tagged variant matching the decoded channel layout.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let color = img.color();
        if color.has_alpha() {
            Self::Rgba(img.into_rgba8())
        } else if color.has_color() {
            Self::Rgb(img.into_rgb8())
        } else {
            Self::Grayscale(img.into_luma8())
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Grayscale(img) => img.dimensions(),
            Self::Rgb(img) => img.dimensions(),
            Self::Rgba(img) => img.dimensions(),
        }
    }

    pub fn has_alpha(&self) -> bool {
        matches!(self, Self::Rgba(_))
    }

    /// Luminance of the image, ignoring any alpha channel.
    pub fn to_luma(&self) -> GrayImage {
        match self {
            Self::Grayscale(img) => img.clone(),
            Self::Rgb(img) => DynamicImage::ImageRgb8(img.clone()).into_luma8(),
            Self::Rgba(img) => {
                let (w, h) = img.dimensions();
                let rgb = RgbImage::from_fn(w, h, |x, y| {
                    let p = img.get_pixel(x, y);
                    image::Rgb([p[0], p[1], p[2]])
                });
                DynamicImage::ImageRgb8(rgb).into_luma8()
            }
        }
    }

    /// Flatten onto an opaque white background.
    ///
    /// Any pixel with non-zero alpha keeps its color unchanged; fully
    /// transparent pixels become white. Images without alpha are returned
    /// as RGB unchanged.
    pub fn composite_on_white(&self) -> RgbImage {
        match self {
            Self::Grayscale(img) => DynamicImage::ImageLuma8(img.clone()).into_rgb8(),
            Self::Rgb(img) => img.clone(),
            Self::Rgba(img) => {
                let (w, h) = img.dimensions();
                RgbImage::from_fn(w, h, |x, y| {
                    let p = img.get_pixel(x, y);
                    if p[3] > 0 {
                        image::Rgb([p[0], p[1], p[2]])
                    } else {
                        image::Rgb([255, 255, 255])
                    }
                })
            }
        }
    }
}

impl From<DynamicImage> for SourceImage {
    fn from(img: DynamicImage) -> Self {
        Self::from_dynamic(img)
    }
}
