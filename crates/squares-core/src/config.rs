//! Tunables of the numerical layers.

use serde::{Deserialize, Serialize};
use squares_numerics::{Cubature, Quadrature, cubature, quadrature};

pub use squares_numerics::{InterpolationKind, Tolerance};

use crate::error::{Result, SquaresError};

/// Settings shared by every computation of a [`Squares`](crate::Squares) engine.
///
/// Missing fields deserialize to their defaults, so a partial document such as
/// `{"tolerance": {"epsrel": 1e-8}}` is valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquaresConfig {
    /// Accuracy requested from every integration.
    pub tolerance: Tolerance,
    /// Maximum number of subintervals of the 1-D quadrature (Delta).
    pub quadrature_limit: usize,
    /// Maximum number of integrand evaluations of the 2-D cubature.
    pub cubature_max_evaluations: usize,
    /// Interpolant replacing the exact CDF inside the full correction.
    pub interpolation: InterpolationKind,
}

impl Default for SquaresConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            quadrature_limit: quadrature::DEFAULT_LIMIT,
            cubature_max_evaluations: cubature::DEFAULT_MAX_EVALUATIONS,
            interpolation: InterpolationKind::Linear,
        }
    }
}

impl SquaresConfig {
    pub fn validate(&self) -> Result<()> {
        self.tolerance.validate()?;
        if self.quadrature_limit == 0 {
            return Err(SquaresError::InvalidInput(
                "quadrature_limit must be positive".to_string(),
            ));
        }
        if self.cubature_max_evaluations == 0 {
            return Err(SquaresError::InvalidInput(
                "cubature_max_evaluations must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn quadrature(&self) -> Quadrature {
        Quadrature::new(self.quadrature_limit)
    }

    pub(crate) fn cubature(&self) -> Cubature {
        Cubature::new(self.cubature_max_evaluations)
    }
}
