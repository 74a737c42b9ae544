//! Numerical building blocks for the weighted-runs statistic.
//!
//! Provides the pieces the distribution code treats as a black box:
//!
//! - [`chisq`]: chi-squared density and cumulative distribution (via `statrs`)
//! - [`Quadrature`]: adaptive 21-point Gauss-Kronrod integration on an interval
//! - [`Cubature`]: adaptive Genz-Malik integration on hyper-rectangles
//! - [`Interpolant`]: monotone piecewise interpolation of tabulated data
//! - [`NeumaierSum`]: compensated floating-point accumulation
//!
//! All integrators report failure to meet the requested [`Tolerance`] as an
//! [`IntegrationError`] carrying the best estimate, never as a silent result.

pub mod chisq;
pub mod cubature;
pub mod error;
pub mod interpolate;
pub mod quadrature;
pub mod sum;

pub use cubature::Cubature;
pub use error::{IntegrationError, InterpolationError};
pub use interpolate::{Interpolant, InterpolationKind};
pub use quadrature::Quadrature;
pub use sum::NeumaierSum;

use serde::{Deserialize, Serialize};

/// Default relative tolerance of every integration.
pub const DEFAULT_EPSREL: f64 = 1e-10;
/// Default absolute tolerance of every integration.
pub const DEFAULT_EPSABS: f64 = 1e-15;

/// Requested accuracy of a numerical integration.
///
/// An estimate is accepted once its error bound is below
/// `max(epsabs, epsrel * |value|)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tolerance {
    pub epsrel: f64,
    pub epsabs: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            epsrel: DEFAULT_EPSREL,
            epsabs: DEFAULT_EPSABS,
        }
    }
}

impl Tolerance {
    pub fn new(epsrel: f64, epsabs: f64) -> Self {
        Self { epsrel, epsabs }
    }

    /// Reject negative, non-finite or all-zero tolerances.
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if !self.epsrel.is_finite() || self.epsrel < 0.0 {
            return Err(IntegrationError::InvalidTolerance(format!(
                "epsrel must be finite and non-negative, got {}",
                self.epsrel
            )));
        }
        if !self.epsabs.is_finite() || self.epsabs < 0.0 {
            return Err(IntegrationError::InvalidTolerance(format!(
                "epsabs must be finite and non-negative, got {}",
                self.epsabs
            )));
        }
        if self.epsrel == 0.0 && self.epsabs == 0.0 {
            return Err(IntegrationError::InvalidTolerance(
                "epsrel and epsabs cannot both be zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Error bound an estimate of `value` has to meet.
    pub fn target(&self, value: f64) -> f64 {
        self.epsabs.max(self.epsrel * value.abs())
    }
}

/// Result of a converged integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    pub value: f64,
    /// Estimated absolute error of `value`.
    pub error: f64,
    /// Number of integrand evaluations spent.
    pub evaluations: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tolerance() {
        let tol = Tolerance::default();
        assert_eq!(tol.epsrel, 1e-10);
        assert_eq!(tol.epsabs, 1e-15);
        assert!(tol.validate().is_ok());
    }

    #[test]
    fn test_tolerance_rejects_bad_values() {
        assert!(Tolerance::new(-1.0, 0.0).validate().is_err());
        assert!(Tolerance::new(1e-8, f64::NAN).validate().is_err());
        assert!(Tolerance::new(0.0, 0.0).validate().is_err());
        assert!(Tolerance::new(1e-7, 0.0).validate().is_ok());
    }

    #[test]
    fn test_target_picks_larger_bound() {
        let tol = Tolerance::new(1e-3, 1e-6);
        assert_eq!(tol.target(1.0), 1e-3);
        assert_eq!(tol.target(1e-6), 1e-6);
    }
}
