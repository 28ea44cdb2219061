//! Drawing of the reconstructed circle and fit markers.
//!
//! The caller owns the canvas; every function here draws into a
//! `&mut RgbImage` and clips at its bounds.

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_line_segment_mut, BresenhamLineIter};
use serde::{Deserialize, Serialize};

use crate::circle::Circle;

/// Appearance of the dashed reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashStyle {
    /// Stroke color (RGB).
    pub color: [u8; 3],
    /// Stroke width in pixels.
    pub thickness: u32,
    /// Arc length of one dash (and one gap) in pixels.
    pub dash_length_px: f64,
}

impl Default for DashStyle {
    fn default() -> Self {
        Self {
            color: [149, 6, 6],
            thickness: 2,
            dash_length_px: 20.0,
        }
    }
}

/// Full overlay appearance: dashed circle plus markers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    pub dash: DashStyle,
    /// Radius of the filled center marker.
    pub center_marker_radius: i32,
    pub center_color: [u8; 3],
    /// Radius of the filled boundary-sample markers.
    pub point_marker_radius: i32,
    pub point_color: [u8; 3],
    /// Mark every `point_stride`-th extracted point.
    pub point_stride: usize,
    /// Fill for expanded canvas area and composite padding.
    pub background: [u8; 3],
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            dash: DashStyle::default(),
            center_marker_radius: 5,
            center_color: [0, 0, 255],
            point_marker_radius: 2,
            point_color: [0, 200, 0],
            point_stride: 5,
            background: [0, 0, 0],
        }
    }
}

/// Chords making up the dashed outline of `circle`.
///
/// The circumference is split into `max(1, floor(2πr / dash_length_px))`
/// equal angular segments; segments with even index are returned as
/// straight chords between their angular endpoints.
pub fn dash_chords(circle: &Circle, dash_length_px: f64) -> Vec<([f64; 2], [f64; 2])> {
    let dash = dash_length_px.max(1.0);
    let n = ((circle.circumference() / dash).floor() as usize).max(1);
    let tau = 2.0 * std::f64::consts::PI;

    (0..n)
        .step_by(2)
        .map(|i| {
            let a0 = i as f64 / n as f64 * tau;
            let a1 = (i + 1) as f64 / n as f64 * tau;
            (circle.point_at(a0), circle.point_at(a1))
        })
        .collect()
}

/// Draw `circle` as a dashed outline.
pub fn draw_dashed_circle(canvas: &mut RgbImage, circle: &Circle, style: &DashStyle) {
    let color = Rgb(style.color);
    for (p0, p1) in dash_chords(circle, style.dash_length_px) {
        draw_thick_segment(canvas, p0, p1, style.thickness, color);
    }
}

/// Draw the full overlay: dashed circle, center marker, and a marker on
/// every `point_stride`-th boundary point.
pub fn render_overlay(
    canvas: &mut RgbImage,
    circle: &Circle,
    points: &[[f64; 2]],
    style: &RenderStyle,
) {
    draw_dashed_circle(canvas, circle, &style.dash);

    draw_filled_circle_mut(
        canvas,
        (circle.cx as i32, circle.cy as i32),
        style.center_marker_radius,
        Rgb(style.center_color),
    );

    for p in points.iter().step_by(style.point_stride.max(1)) {
        draw_filled_circle_mut(
            canvas,
            (p[0] as i32, p[1] as i32),
            style.point_marker_radius,
            Rgb(style.point_color),
        );
    }
}

fn draw_thick_segment(
    canvas: &mut RgbImage,
    p0: [f64; 2],
    p1: [f64; 2],
    thickness: u32,
    color: Rgb<u8>,
) {
    let start = (p0[0] as f32, p0[1] as f32);
    let end = (p1[0] as f32, p1[1] as f32);
    if thickness <= 1 {
        draw_line_segment_mut(canvas, start, end, color);
        return;
    }
    let radius = (thickness / 2) as i32;
    for (x, y) in BresenhamLineIter::new(start, end) {
        draw_filled_circle_mut(canvas, (x, y), radius, color);
    }
}
