use std::collections::HashMap;

use nalgebra::{Matrix2, SymmetricEigen, Vector2};
use tiny_solver::factors::na as ts_na;
use tiny_solver::Optimizer;

use super::types::{ConvergenceReason, FitConfig};

/// Added to squared distances so a center sitting on a data point keeps a
/// finite residual with a zero (sub)gradient for that point.
const DIST_EPS_SQ: f64 = 1e-24;

/// Residual level, relative to the point extent, treated as an exact fit.
const EXACT_RESIDUAL: f64 = 1e-9;

/// Normal equations of the radial-variance residuals at one center.
pub(super) struct Evaluation {
    pub cost: f64,
    pub jtj: Matrix2<f64>,
    pub jtr: Vector2<f64>,
}

pub(super) struct Solution {
    pub center: Vector2<f64>,
    /// Sum of squared residuals at `center`.
    pub cost: f64,
}

/// Residuals `r_i = d_i - mean(d)` with `d_i = |p_i - c|`, plus their
/// Jacobian accumulated into `JᵀJ` and `Jᵀr`.
///
/// `∂r_i/∂c = u_i - mean(u)` with `u_i = (c - p_i) / d_i`.
pub(super) fn evaluate(points: &[[f64; 2]], c: &Vector2<f64>) -> Option<Evaluation> {
    let n = points.len() as f64;
    let mut dist = Vec::with_capacity(points.len());
    let mut units = Vec::with_capacity(points.len());
    let mut sum_d = 0.0f64;
    let mut sum_u = Vector2::<f64>::zeros();

    for p in points {
        let dx = c[0] - p[0];
        let dy = c[1] - p[1];
        let d = (dx * dx + dy * dy + DIST_EPS_SQ).sqrt();
        if !d.is_finite() {
            return None;
        }
        let u = Vector2::new(dx / d, dy / d);
        sum_d += d;
        sum_u += u;
        dist.push(d);
        units.push(u);
    }

    let mean_d = sum_d / n;
    let mean_u = sum_u / n;

    let mut cost = 0.0f64;
    let mut jtj = Matrix2::<f64>::zeros();
    let mut jtr = Vector2::<f64>::zeros();
    for (d, u) in dist.iter().zip(&units) {
        let r = d - mean_d;
        let j = u - mean_u;
        cost += r * r;
        jtj += j * j.transpose();
        jtr += j * r;
    }

    if !cost.is_finite() || jtj.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(Evaluation { cost, jtj, jtr })
}

/// All radial-variance residuals as a single factor on the center `c`.
#[derive(Debug, Clone)]
struct RadialVarianceFactor {
    points: Vec<[f64; 2]>,
}

impl<T: ts_na::RealField> tiny_solver::factors::Factor<T> for RadialVarianceFactor {
    fn residual_func(&self, params: &[ts_na::DVector<T>]) -> ts_na::DVector<T> {
        let c = &params[0];
        let eps: T = ts_na::convert(DIST_EPS_SQ);
        let dists: Vec<T> = self
            .points
            .iter()
            .map(|p| {
                let dx = ts_na::convert::<f64, T>(p[0]) - c[0].clone();
                let dy = ts_na::convert::<f64, T>(p[1]) - c[1].clone();
                (dx.clone() * dx + dy.clone() * dy + eps.clone()).sqrt()
            })
            .collect();

        let mut sum: T = ts_na::convert(0.0);
        for d in &dists {
            sum += d.clone();
        }
        let n: T = ts_na::convert(self.points.len() as f64);
        let mean = sum / n;

        ts_na::DVector::<T>::from_iterator(
            dists.len(),
            dists.into_iter().map(|d| d - mean.clone()),
        )
    }
}

/// Levenberg–Marquardt on the circle center, started at `init`.
///
/// `extent` is the largest point distance from `init`; it scales the
/// exact-fit floor and bounds how far the center may travel
/// (`max_radius_ratio * extent`) before the fit counts as diverged. The
/// optimizer reports no convergence status, so the returned center is
/// checked afterwards: a rank-deficient normal matrix is `Degenerate`, and
/// a Gauss–Newton model promising more than `gradient_tol` of the
/// remaining cost means the iteration budget ran out.
pub(super) fn solve_center_lm(
    points: &[[f64; 2]],
    init: Vector2<f64>,
    extent: f64,
    config: &FitConfig,
) -> Result<Solution, ConvergenceReason> {
    let exact_cost = points.len() as f64 * (EXACT_RESIDUAL * extent).powi(2);

    let mut problem = tiny_solver::Problem::new();
    problem.add_residual_block(
        points.len(),
        &["c"],
        Box::new(RadialVarianceFactor {
            points: points.to_vec(),
        }),
        None,
    );

    let mut initial_values = HashMap::<String, ts_na::DVector<f64>>::new();
    initial_values.insert(
        "c".to_string(),
        ts_na::DVector::<f64>::from_vec(vec![init[0], init[1]]),
    );

    let optimizer = tiny_solver::LevenbergMarquardtOptimizer::default();
    let options = tiny_solver::OptimizerOptions {
        max_iteration: config.max_iters.max(1),
        verbosity_level: 0,
        min_abs_error_decrease_threshold: 0.0,
        min_rel_error_decrease_threshold: config.ftol,
        min_error_threshold: 0.25 * exact_cost,
        ..Default::default()
    };
    let result = optimizer
        .optimize(&problem, &initial_values, Some(options))
        .ok_or(ConvergenceReason::NonFinite)?;
    let c = result
        .get("c")
        .filter(|c| c.len() == 2)
        .ok_or(ConvergenceReason::NonFinite)?;
    let center = Vector2::new(c[0], c[1]);
    if !center[0].is_finite() || !center[1].is_finite() {
        return Err(ConvergenceReason::NonFinite);
    }

    if (center - init).norm() > config.max_radius_ratio * extent {
        return Err(ConvergenceReason::Diverged);
    }

    let eval = evaluate(points, &center).ok_or(ConvergenceReason::NonFinite)?;
    if !is_well_conditioned(&eval.jtj, config.min_conditioning) {
        return Err(ConvergenceReason::Degenerate);
    }
    if eval.cost > exact_cost {
        if let Some(step) = eval.jtj.lu().solve(&eval.jtr) {
            let predicted = eval.jtr.dot(&step);
            if !predicted.is_finite() {
                return Err(ConvergenceReason::NonFinite);
            }
            if predicted > config.gradient_tol * eval.cost {
                return Err(ConvergenceReason::MaxIterations);
            }
        }
    }

    Ok(Solution {
        center,
        cost: eval.cost,
    })
}

/// Eigenvalue ratio test on the 2×2 normal matrix.
fn is_well_conditioned(jtj: &Matrix2<f64>, min_ratio: f64) -> bool {
    let eig = SymmetricEigen::new(*jtj).eigenvalues;
    let hi = eig[0].abs().max(eig[1].abs());
    let lo = eig[0].abs().min(eig[1].abs());
    hi.is_finite() && hi > 0.0 && lo / hi >= min_ratio
}
