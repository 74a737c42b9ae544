//! Chi-squared distribution with integer degrees of freedom.

use statrs::distribution::{ChiSquared, Continuous, ContinuousCDF};

fn distribution(dof: u32) -> ChiSquared {
    assert!(dof > 0, "degrees of freedom must be positive");
    ChiSquared::new(f64::from(dof)).expect("positive degrees of freedom are valid")
}

/// Probability density of a chi-squared variate with `dof` degrees of freedom.
///
/// # Panics
/// Panics if `dof == 0`.
pub fn pdf(x: f64, dof: u32) -> f64 {
    if x < 0.0 {
        return 0.0;
    }
    distribution(dof).pdf(x)
}

/// Cumulative distribution `P(X <= x)` of a chi-squared variate.
///
/// # Panics
/// Panics if `dof == 0`.
pub fn cdf(x: f64, dof: u32) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    distribution(dof).cdf(x)
}
