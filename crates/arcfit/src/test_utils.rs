//! Shared synthetic-image helpers for unit tests.

use image::{GrayImage, Luma, Rgba, RgbaImage};

/// Render an arc stroke on a uniform background.
///
/// Pixels at distance `d` and angle `theta` from `center` get `arc_pix` if
/// `|d - radius| <= half_width` and `theta` lies in `[theta0, theta1]`
/// (radians, `theta1 - theta0 < 2π`), `bg_pix` otherwise.
#[allow(clippy::too_many_arguments)]
pub(crate) fn draw_arc_image(
    w: u32,
    h: u32,
    center: [f64; 2],
    radius: f64,
    half_width: f64,
    theta: [f64; 2],
    arc_pix: u8,
    bg_pix: u8,
) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        if on_arc(x, y, center, radius, half_width, theta) {
            Luma([arc_pix])
        } else {
            Luma([bg_pix])
        }
    })
}

/// Same arc as [`draw_arc_image`], stroked in `rgb` on a fully transparent
/// background.
pub(crate) fn draw_arc_rgba(
    w: u32,
    h: u32,
    center: [f64; 2],
    radius: f64,
    half_width: f64,
    theta: [f64; 2],
    rgb: [u8; 3],
) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        if on_arc(x, y, center, radius, half_width, theta) {
            Rgba([rgb[0], rgb[1], rgb[2], 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

fn on_arc(
    x: u32,
    y: u32,
    center: [f64; 2],
    radius: f64,
    half_width: f64,
    theta: [f64; 2],
) -> bool {
    let dx = x as f64 - center[0];
    let dy = y as f64 - center[1];
    let d = (dx * dx + dy * dy).sqrt();
    if (d - radius).abs() > half_width {
        return false;
    }
    let tau = 2.0 * std::f64::consts::PI;
    let rel = (dy.atan2(dx) - theta[0]).rem_euclid(tau);
    rel <= theta[1] - theta[0]
}

/// Mean distance of `points` to `center`.
pub(crate) fn mean_distance(points: &[[f64; 2]], center: [f64; 2]) -> f64 {
    points
        .iter()
        .map(|p| ((p[0] - center[0]).powi(2) + (p[1] - center[1]).powi(2)).sqrt())
        .sum::<f64>()
        / points.len() as f64
}
