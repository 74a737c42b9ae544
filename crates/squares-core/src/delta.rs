//! First-order correction for joining two blocks.
//!
//! When two sequences of `Nl` and `Nr` observations are concatenated, a run
//! ending the left block and a run starting the right block merge. `Delta` is
//! the probability that the merged run exceeds `Tobs` although neither part
//! does on its own:
//!
//! ```text
//! Delta(Tobs, Nl, Nr) = int_0^Tobs h(x, Nl) H(Tobs - x, Tobs, Nr) dx
//! ```

use log::debug;
use squares_numerics::{Quadrature, Tolerance};

use crate::error::{Result, check_length, check_statistic};
use crate::mixture;

/// `Delta(tobs, nl, nr)` by adaptive Gauss-Kronrod quadrature.
///
/// Fails with [`SquaresError::Integration`](crate::SquaresError::Integration)
/// if the quadrature cannot reach `tolerance` within its subinterval limit.
pub(crate) fn delta(
    tobs: f64,
    nl: u32,
    nr: u32,
    quadrature: &Quadrature,
    tolerance: Tolerance,
) -> Result<f64> {
    check_statistic(tobs)?;
    check_length("Nl", nl)?;
    check_length("Nr", nr)?;
    if tobs == 0.0 {
        return Ok(0.0);
    }

    let integrand = |x: f64| mixture::pdf(x, nl) * mixture::interval(tobs - x, tobs, nr);
    let estimate = quadrature.integrate(integrand, 0.0, tobs, tolerance)?;
    debug!(
        "Delta({tobs}, {nl}, {nr}) = {:e} +/- {:e} ({} evaluations)",
        estimate.value, estimate.error, estimate.evaluations
    );
    Ok(estimate.value)
}
