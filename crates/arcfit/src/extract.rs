//! Arc boundary extraction: smoothing → Canny edges → border following.
//!
//! The largest external contour (by enclosed polygon area) of the edge map
//! is taken as the arc. Failure to find a usable contour is reported as a
//! [`NotFound`] value, never as a panic.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use serde::{Deserialize, Serialize};

/// Edge/contour parameters for arc extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Gaussian smoothing sigma (pixels) applied before edge detection.
    pub blur_sigma: f32,
    /// Canny hysteresis low threshold.
    pub canny_low: f32,
    /// Canny hysteresis high threshold.
    pub canny_high: f32,
    /// Minimum number of contour points for the arc to be trusted.
    pub min_points: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.0,
            canny_low: 50.0,
            canny_high: 150.0,
            min_points: 10,
        }
    }
}

/// No usable arc in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    /// The edge map has no external contours (blank or contrast-free image).
    NoContours,
    /// The largest contour is too small to be an arc; likely noise.
    TooFewPoints {
        /// Points on the largest contour.
        found: usize,
        /// Configured minimum.
        needed: usize,
    },
}

impl std::fmt::Display for NotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoContours => write!(
                f,
                "no contours found (blank image, no contrast, or unsuitable edge thresholds)"
            ),
            Self::TooFewPoints { found, needed } => write!(
                f,
                "largest contour has only {} points, below the threshold of {}",
                found, needed
            ),
        }
    }
}

impl std::error::Error for NotFound {}

/// Extract the boundary points of the dominant arc in `gray`.
///
/// Points are integer pixel positions in contour tracing order.
pub fn extract_boundary(
    gray: &GrayImage,
    config: &ExtractConfig,
) -> Result<Vec<[f64; 2]>, NotFound> {
    let blurred = if config.blur_sigma > 0.0 {
        imageproc::filter::gaussian_blur_f32(gray, config.blur_sigma)
    } else {
        gray.clone()
    };
    let edges = imageproc::edges::canny(&blurred, config.canny_low, config.canny_high);

    let contours: Vec<Contour<i32>> = find_contours(&edges);
    let external: Vec<&Contour<i32>> = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .collect();

    tracing::debug!(
        "edge map: {} contours, {} external",
        contours.len(),
        external.len()
    );

    // First contour wins ties.
    let mut best: Option<(&Contour<i32>, f64)> = None;
    for c in external {
        let area = polygon_area(&c.points);
        if best.map_or(true, |(_, a)| area > a) {
            best = Some((c, area));
        }
    }
    let Some((largest, area)) = best else {
        return Err(NotFound::NoContours);
    };

    if largest.points.len() < config.min_points {
        return Err(NotFound::TooFewPoints {
            found: largest.points.len(),
            needed: config.min_points,
        });
    }

    tracing::debug!(
        "selected contour: {} points, area {:.1}",
        largest.points.len(),
        area
    );

    Ok(largest
        .points
        .iter()
        .map(|p| [f64::from(p.x), f64::from(p.y)])
        .collect())
}

/// Unsigned polygon area by the shoelace formula (closed polygon).
pub fn polygon_area(points: &[imageproc::point::Point<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = &points[(i + 1) % points.len()];
        twice += i64::from(p.x) * i64::from(q.y) - i64::from(q.x) * i64::from(p.y);
    }
    twice.abs() as f64 * 0.5
}
