//! Error types of the numerical layer.

use thiserror::Error;

/// Failure of an adaptive integration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IntegrationError {
    /// The evaluation or subdivision budget ran out before the tolerance was met.
    #[error(
        "integration did not converge: estimate {value:e} with error {error:e} after {evaluations} evaluations"
    )]
    NotConverged {
        value: f64,
        error: f64,
        evaluations: usize,
    },
    /// The integrand produced NaN or an infinity.
    #[error("integrand returned {value} at {point:?}")]
    NonFinite { point: Vec<f64>, value: f64 },
    #[error("invalid integration domain: {0}")]
    InvalidDomain(String),
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(String),
}

/// Failure to build an interpolant from tabulated data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("need at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("abscissae and ordinates differ in length: {xs} vs {ys}")]
    LengthMismatch { xs: usize, ys: usize },
    #[error("abscissae must be finite and strictly increasing (index {index})")]
    NotIncreasing { index: usize },
    #[error("non-finite ordinate at index {index}")]
    NonFinite { index: usize },
}
