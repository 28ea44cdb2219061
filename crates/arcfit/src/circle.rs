//! Geometric circle type.

use serde::{Deserialize, Serialize};

/// Circle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    /// Center x.
    pub cx: f64,
    /// Center y.
    pub cy: f64,
    /// Radius in pixels.
    pub r: f64,
}

impl Circle {
    /// Build a circle, rejecting non-finite values and non-positive radii.
    pub fn new(cx: f64, cy: f64, r: f64) -> Option<Self> {
        let c = Self { cx, cy, r };
        c.is_valid().then_some(c)
    }

    /// Check that all parameters are finite and the radius is positive.
    pub fn is_valid(&self) -> bool {
        self.cx.is_finite() && self.cy.is_finite() && self.r.is_finite() && self.r > 0.0
    }

    pub fn center(&self) -> [f64; 2] {
        [self.cx, self.cy]
    }

    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.r
    }

    /// Axis-aligned bounds as `[min_x, min_y, max_x, max_y]`.
    pub fn bounds(&self) -> [f64; 4] {
        [
            self.cx - self.r,
            self.cy - self.r,
            self.cx + self.r,
            self.cy + self.r,
        ]
    }

    /// Same circle with the center shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            r: self.r,
        }
    }

    /// Point on the circle at angle `theta` (radians, measured from +x
    /// towards +y, i.e. clockwise on screen).
    pub fn point_at(&self, theta: f64) -> [f64; 2] {
        [
            self.cx + self.r * theta.cos(),
            self.cy + self.r * theta.sin(),
        ]
    }

    /// Sample `n` points evenly spaced over the angular range
    /// `[theta0, theta1]` (inclusive of both ends when `n > 1`).
    pub fn sample_arc(&self, theta0: f64, theta1: f64, n: usize) -> Vec<[f64; 2]> {
        match n {
            0 => Vec::new(),
            1 => vec![self.point_at(theta0)],
            _ => (0..n)
                .map(|i| {
                    let t = i as f64 / (n - 1) as f64;
                    self.point_at(theta0 + t * (theta1 - theta0))
                })
                .collect(),
        }
    }
}
