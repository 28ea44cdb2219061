//! Least-squares circle fitting.
//!
//! The center is found by minimizing the variance of the point-to-center
//! distances, i.e. the residuals `|p_i - c| - mean_j |p_j - c|`, with a
//! Levenberg–Marquardt iteration (`tiny_solver`) started at the centroid.
//! The radius is the mean distance to the optimized center.

mod solver;
mod types;

use nalgebra::Vector2;

use crate::circle::Circle;
pub use types::{ConvergenceReason, FitConfig, FitError, FitReport};

/// Minimum number of points that determine a circle.
pub const MIN_FIT_POINTS: usize = 3;

/// Fit a circle to `points` and return it.
///
/// Non-finite points are ignored. Fails with [`FitError::InvalidInput`]
/// when fewer than three usable points remain and with
/// [`FitError::ConvergenceFailure`] when the optimizer does not reach a
/// well-posed solution (collinear points, runaway radius).
pub fn fit_circle(points: &[[f64; 2]], config: &FitConfig) -> Result<Circle, FitError> {
    fit_circle_report(points, config).map(|r| r.circle)
}

/// Fit a circle and keep the solver diagnostics.
pub fn fit_circle_report(points: &[[f64; 2]], config: &FitConfig) -> Result<FitReport, FitError> {
    let pts: Vec<[f64; 2]> = points
        .iter()
        .copied()
        .filter(|p| p[0].is_finite() && p[1].is_finite())
        .collect();
    if pts.len() < MIN_FIT_POINTS {
        return Err(FitError::InvalidInput {
            needed: MIN_FIT_POINTS,
            got: pts.len(),
        });
    }

    let centroid = centroid(&pts);
    let extent = pts
        .iter()
        .map(|p| (Vector2::new(p[0], p[1]) - centroid).norm())
        .fold(0.0f64, f64::max);
    if extent <= 1e-12 {
        return Err(FitError::ConvergenceFailure(ConvergenceReason::Degenerate));
    }

    let solution = solver::solve_center_lm(&pts, centroid, extent, config)
        .map_err(FitError::ConvergenceFailure)?;

    let c = solution.center;
    let dists: Vec<f64> = pts
        .iter()
        .map(|p| ((p[0] - c[0]).powi(2) + (p[1] - c[1]).powi(2)).sqrt())
        .collect();
    let r = dists.iter().sum::<f64>() / dists.len() as f64;
    if r > config.max_radius_ratio * extent {
        return Err(FitError::ConvergenceFailure(ConvergenceReason::Diverged));
    }
    let circle = Circle::new(c[0], c[1], r)
        .ok_or(FitError::ConvergenceFailure(ConvergenceReason::NonFinite))?;

    let rms_residual =
        (dists.iter().map(|d| (d - r).powi(2)).sum::<f64>() / dists.len() as f64).sqrt();

    tracing::debug!(
        "circle fit: center=({:.3}, {:.3}) r={:.3} rms={:.4} cost={:.3e}",
        circle.cx,
        circle.cy,
        circle.r,
        rms_residual,
        solution.cost,
    );

    Ok(FitReport {
        circle,
        cost: solution.cost,
        rms_residual,
    })
}

fn centroid(points: &[[f64; 2]]) -> Vector2<f64> {
    let n = points.len() as f64;
    let sx: f64 = points.iter().map(|p| p[0]).sum();
    let sy: f64 = points.iter().map(|p| p[1]).sum();
    Vector2::new(sx / n, sy / n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::prelude::*;

    fn circle(cx: f64, cy: f64, r: f64) -> Circle {
        Circle::new(cx, cy, r).unwrap()
    }

    #[test]
    fn recovers_full_circle_exactly() {
        let truth = circle(100.0, 80.0, 35.0);
        let pts = truth.sample_arc(0.0, 2.0 * std::f64::consts::PI * 0.99, 60);
        let fitted = fit_circle(&pts, &FitConfig::default()).expect("fit should succeed");

        assert_relative_eq!(fitted.cx, truth.cx, max_relative = 1e-6);
        assert_relative_eq!(fitted.cy, truth.cy, max_relative = 1e-6);
        assert_relative_eq!(fitted.r, truth.r, max_relative = 1e-6);
    }

    #[test]
    fn recovers_partial_arcs_exactly() {
        let cases = [
            (circle(50.0, 50.0, 30.0), -1.0, 2.5, 40),
            (circle(-20.0, 310.0, 120.0), 0.3, 1.4, 25),
            (circle(400.0, 12.5, 8.0), 3.0, 4.2, 12),
        ];
        for (truth, t0, t1, n) in cases {
            let pts = truth.sample_arc(t0, t1, n);
            let report = fit_circle_report(&pts, &FitConfig::default())
                .unwrap_or_else(|e| panic!("fit of {:?} failed: {}", truth, e));
            let fitted = report.circle;

            assert_relative_eq!(fitted.cx, truth.cx, max_relative = 1e-6, epsilon = 1e-6);
            assert_relative_eq!(fitted.cy, truth.cy, max_relative = 1e-6, epsilon = 1e-6);
            assert_relative_eq!(fitted.r, truth.r, max_relative = 1e-6);
            assert!(report.rms_residual < 1e-6, "rms {}", report.rms_residual);
        }
    }

    #[test]
    fn three_points_define_a_circle() {
        let truth = circle(3.0, -2.0, 5.0);
        let pts = truth.sample_arc(0.1, 2.0, 3);
        let fitted = fit_circle(&pts, &FitConfig::default()).expect("three points suffice");
        assert_relative_eq!(fitted.cx, 3.0, epsilon = 1e-6);
        assert_relative_eq!(fitted.cy, -2.0, epsilon = 1e-6);
        assert_relative_eq!(fitted.r, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn noisy_arc_stays_close() {
        let truth = circle(120.0, 90.0, 40.0);
        let mut pts = truth.sample_arc(-0.5, 2.0, 150);
        let mut rng = StdRng::seed_from_u64(123);
        let noise = 0.5;
        for p in &mut pts {
            p[0] += rng.gen_range(-noise..noise);
            p[1] += rng.gen_range(-noise..noise);
        }

        let fitted = fit_circle(&pts, &FitConfig::default()).expect("noisy fit should succeed");
        assert_relative_eq!(fitted.cx, truth.cx, epsilon = 1.0);
        assert_relative_eq!(fitted.cy, truth.cy, epsilon = 1.0);
        assert_relative_eq!(fitted.r, truth.r, epsilon = 1.0);
    }

    #[test]
    fn too_few_points_is_invalid_input() {
        let cfg = FitConfig::default();
        assert_eq!(
            fit_circle(&[], &cfg),
            Err(FitError::InvalidInput { needed: 3, got: 0 })
        );
        assert_eq!(
            fit_circle(&[[0.0, 0.0], [1.0, 1.0]], &cfg),
            Err(FitError::InvalidInput { needed: 3, got: 2 })
        );
        assert_eq!(
            fit_circle(&[[0.0, 0.0], [1.0, 1.0], [f64::NAN, 2.0]], &cfg),
            Err(FitError::InvalidInput { needed: 3, got: 2 })
        );
    }

    #[test]
    fn evenly_spaced_collinear_points_fail_to_converge() {
        let pts: Vec<[f64; 2]> = (0..10)
            .map(|i| [i as f64, 2.0 * i as f64 + 1.0])
            .collect();
        let err = fit_circle(&pts, &FitConfig::default()).unwrap_err();
        assert!(
            matches!(err, FitError::ConvergenceFailure(_)),
            "expected convergence failure, got {:?}",
            err
        );
    }

    #[test]
    fn unevenly_spaced_collinear_points_fail_to_converge() {
        let pts: Vec<[f64; 2]> = [0.0, 1.0, 3.0, 7.0, 12.0, 20.0]
            .iter()
            .map(|&x| [x, 0.5 * x + 4.0])
            .collect();
        let err = fit_circle(&pts, &FitConfig::default()).unwrap_err();
        assert!(
            matches!(err, FitError::ConvergenceFailure(_)),
            "expected convergence failure, got {:?}",
            err
        );
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let pts = [[4.0, 4.0]; 5];
        assert_eq!(
            fit_circle(&pts, &FitConfig::default()),
            Err(FitError::ConvergenceFailure(ConvergenceReason::Degenerate))
        );
    }

    #[test]
    fn fit_is_bit_reproducible() {
        let truth = circle(64.0, 48.0, 22.0);
        let mut pts = truth.sample_arc(0.4, 2.2, 80);
        let mut rng = StdRng::seed_from_u64(7);
        for p in &mut pts {
            p[0] += rng.gen_range(-0.3..0.3);
            p[1] += rng.gen_range(-0.3..0.3);
        }
        let a = fit_circle(&pts, &FitConfig::default()).unwrap();
        let b = fit_circle(&pts, &FitConfig::default()).unwrap();
        assert_eq!(a.cx.to_bits(), b.cx.to_bits());
        assert_eq!(a.cy.to_bits(), b.cy.to_bits());
        assert_eq!(a.r.to_bits(), b.r.to_bits());
    }

    #[test]
    fn iteration_budget_exhaustion_is_reported() {
        let truth = circle(0.0, 0.0, 10.0);
        let pts = truth.sample_arc(0.0, 1.0, 20);
        let cfg = FitConfig {
            max_iters: 1,
            ftol: 0.0,
            ..Default::default()
        };
        assert_eq!(
            fit_circle(&pts, &cfg),
            Err(FitError::ConvergenceFailure(ConvergenceReason::MaxIterations))
        );
    }

    #[test]
    fn centroid_on_a_data_point_still_fits() {
        let truth = circle(0.0, 0.0, 10.0);
        let mut pts = truth.sample_arc(-0.8, 2.2, 30);
        let c = centroid(&pts);
        pts.push([c[0], c[1]]);

        let fitted =
            fit_circle(&pts, &FitConfig::default()).expect("fit should step off the point");
        assert!(fitted.cx.abs() < 1.0, "cx {}", fitted.cx);
        assert!(fitted.cy.abs() < 1.0, "cy {}", fitted.cy);
        assert!((fitted.r - 10.0).abs() < 1.0, "r {}", fitted.r);

        let nudged = {
            let mut p = pts.clone();
            let last = p.len() - 1;
            p[last][0] += 1e-3;
            fit_circle(&p, &FitConfig::default()).unwrap()
        };
        assert_relative_eq!(fitted.cx, nudged.cx, epsilon = 1e-2);
        assert_relative_eq!(fitted.cy, nudged.cy, epsilon = 1e-2);
        assert_relative_eq!(fitted.r, nudged.r, epsilon = 1e-2);
    }
}
