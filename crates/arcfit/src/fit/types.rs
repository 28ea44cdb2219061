//! Fitter configuration, diagnostics and error types.

use serde::{Deserialize, Serialize};

use crate::circle::Circle;

// ── Error type ─────────────────────────────────────────────────────────────

/// Why the optimizer did not produce a usable circle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceReason {
    /// Iteration budget exhausted away from a stationary point.
    MaxIterations,
    /// Residuals, Jacobian or step became NaN/inf.
    NonFinite,
    /// Normal matrix is rank deficient at the solution (e.g. collinear points).
    Degenerate,
    /// Center ran away: radius far beyond the point spread.
    Diverged,
}

impl std::fmt::Display for ConvergenceReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MaxIterations => write!(f, "iteration limit reached"),
            Self::NonFinite => write!(f, "non-finite residuals"),
            Self::Degenerate => write!(f, "center is undetermined (points may be collinear)"),
            Self::Diverged => write!(f, "radius diverged far beyond the point spread"),
        }
    }
}

/// Errors that can occur during circle fitting.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    /// Too few (or non-finite) points for a circle.
    InvalidInput {
        /// Required minimum number of points.
        needed: usize,
        /// Number of usable points provided.
        got: usize,
    },
    /// Optimizer failed to converge to a finite, well-posed circle.
    ConvergenceFailure(ConvergenceReason),
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { needed, got } => {
                write!(f, "invalid input: need at least {} finite points, got {}", needed, got)
            }
            Self::ConvergenceFailure(reason) => {
                write!(f, "circle fit failed to converge: {}", reason)
            }
        }
    }
}

impl std::error::Error for FitError {}

// ── Types ──────────────────────────────────────────────────────────────────

/// Solver configuration for the radial-variance circle fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Maximum number of Levenberg–Marquardt iterations.
    pub max_iters: usize,
    /// Stop once an iteration lowers the cost by less than this fraction.
    pub ftol: f64,
    /// Largest fraction of the remaining cost a Gauss–Newton step may still
    /// promise at an accepted solution.
    pub gradient_tol: f64,
    /// Reject solutions whose normal matrix has eigenvalue ratio below this.
    pub min_conditioning: f64,
    /// Reject radii larger than this multiple of the point-cloud extent.
    pub max_radius_ratio: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iters: 200,
            ftol: 1.49012e-8,
            gradient_tol: 1e-4,
            min_conditioning: 1e-10,
            max_radius_ratio: 1e4,
        }
    }
}

/// Fitted circle with solver diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub circle: Circle,
    /// Sum of squared radial-variance residuals at the solution.
    pub cost: f64,
    /// RMS of `|p - c| - r` over all points (pixels).
    pub rms_residual: f64,
}
