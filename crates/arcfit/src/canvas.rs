//! Canvas growth for circles that leave the image, and the side-by-side
//! composite.

use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::circle::Circle;

/// Pixels added on each side of the drawing canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasPadding {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CanvasPadding {
    /// Padding needed for the bounding box of `circle` to fit a `w`×`h`
    /// canvas. Each edge is computed independently and rounded up to
    /// whole pixels.
    pub fn for_circle(circle: &Circle, w: u32, h: u32) -> Self {
        let [min_x, min_y, max_x, max_y] = circle.bounds();
        let pad = |overflow: f64| overflow.max(0.0).ceil() as u32;
        Self {
            left: pad(-min_x),
            top: pad(-min_y),
            right: pad(max_x - w as f64),
            bottom: pad(max_y - h as f64),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Translation applied to content coordinates, `[left, top]`.
    pub fn offset(&self) -> [f64; 2] {
        [f64::from(self.left), f64::from(self.top)]
    }

    /// Canvas size after padding a `w`×`h` canvas.
    pub fn padded_size(&self, w: u32, h: u32) -> (u64, u64) {
        (
            u64::from(w) + u64::from(self.left) + u64::from(self.right),
            u64::from(h) + u64::from(self.top) + u64::from(self.bottom),
        )
    }

    /// Move a point into padded-canvas coordinates.
    pub fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [p[0] + f64::from(self.left), p[1] + f64::from(self.top)]
    }
}

/// Grow `canvas` by `pad`, filling new area with `background`. The
/// original content lands at `(pad.left, pad.top)`.
pub fn expand_canvas(canvas: &RgbImage, pad: &CanvasPadding, background: [u8; 3]) -> RgbImage {
    if pad.is_empty() {
        return canvas.clone();
    }
    let (w, h) = canvas.dimensions();
    let new_w = w + pad.left + pad.right;
    let new_h = h + pad.top + pad.bottom;
    let mut out = RgbImage::from_pixel(new_w, new_h, Rgb(background));
    image::imageops::replace(&mut out, canvas, i64::from(pad.left), i64::from(pad.top));
    out
}

/// Place `left` and `right` next to each other, top-aligned. The shorter
/// one is padded below with `background`.
pub fn compose_side_by_side(left: &RgbImage, right: &RgbImage, background: [u8; 3]) -> RgbImage {
    let (w1, h1) = left.dimensions();
    let (w2, h2) = right.dimensions();
    let mut out = RgbImage::from_pixel(w1 + w2, h1.max(h2), Rgb(background));
    image::imageops::replace(&mut out, left, 0, 0);
    image::imageops::replace(&mut out, right, i64::from(w1), 0);
    out
}
