//! Full two-dimensional correction for joining two blocks.
//!
//! `Delta` assumes the merged run is the only thing that matters; the full
//! correction also requires the joined sequence to stay below `Tobs`
//! everywhere else:
//!
//! ```text
//! C = iint_{x, y <= Tobs, x + y >= Tobs} h(x, Nl) h(y, Nr) F(x + y | Nl + Nr) dx dy
//! ```
//!
//! The triangle is mapped onto the unit square with
//! `x = Tobs (1 - u v)`, `y = Tobs (1 - u + u v)`, Jacobian `Tobs^2 u`, and
//! handed to the adaptive cubature. Since `x + y` only ranges over
//! `[Tobs, 2 Tobs]`, the exact CDF can be tabulated there once and
//! interpolated instead of enumerated at every sample point.

use std::cell::Cell;

use log::debug;
use squares_numerics::{Interpolant, InterpolationKind};

use crate::config::SquaresConfig;
use crate::error::{Result, SquaresError, check_length, check_statistic};
use crate::exact::ExactCdf;
use crate::mixture;

/// How `F(x + y | Nl + Nr)` is evaluated inside the integrand.
pub(crate) enum CdfSource<'a> {
    /// Enumerate exactly at every sample point.
    Exact(&'a ExactCdf),
    /// Interpolate a table of exact values.
    Table(Interpolant),
}

impl CdfSource<'_> {
    fn eval(&self, x: f64, n: u32) -> Result<f64> {
        match self {
            Self::Exact(exact) => exact.cumulative(x, n),
            Self::Table(interpolant) => Ok(interpolant.eval(x)),
        }
    }
}

/// Tabulate `F(. | n)` on `points` equidistant nodes spanning `[tobs, 2 tobs]`.
pub(crate) fn tabulate(
    exact: &ExactCdf,
    tobs: f64,
    n: u32,
    points: usize,
    kind: InterpolationKind,
) -> Result<Interpolant> {
    let step = tobs / (points - 1) as f64;
    let xs: Vec<f64> = (0..points).map(|i| tobs + i as f64 * step).collect();
    let ys = xs
        .iter()
        .map(|&x| exact.cumulative(x, n))
        .collect::<Result<Vec<f64>>>()?;
    debug!("tabulated F(. | {n}) on {points} nodes over [{tobs}, {}]", 2.0 * tobs);
    Ok(Interpolant::new(kind, xs, ys)?)
}

/// Full correction for blocks of `nl` and `nr` observations.
///
/// `interpolation_points >= 2` replaces the exact CDF by an interpolant of
/// the configured kind on that many nodes; smaller values evaluate it exactly.
pub(crate) fn full_correction(
    exact: &ExactCdf,
    tobs: f64,
    nl: u32,
    nr: u32,
    interpolation_points: usize,
    config: &SquaresConfig,
) -> Result<f64> {
    check_statistic(tobs)?;
    check_length("Nl", nl)?;
    check_length("Nr", nr)?;
    let n = nl.checked_add(nr).ok_or_else(|| {
        SquaresError::InvalidInput(format!("Nl + Nr overflows: {nl} + {nr}"))
    })?;
    config.validate()?;
    if tobs == 0.0 {
        return Ok(0.0);
    }

    let source = if interpolation_points >= 2 {
        CdfSource::Table(tabulate(
            exact,
            tobs,
            n,
            interpolation_points,
            config.interpolation,
        )?)
    } else {
        CdfSource::Exact(exact)
    };

    // the cubature only understands numbers; park the first failure here
    let failure = Cell::new(None);
    let integrand = |uv: &[f64]| {
        let (u, v) = (uv[0], uv[1]);
        let x = tobs * (1.0 - u * v);
        let y = tobs * (1.0 - u + u * v);
        let jacobian = tobs * tobs * u;
        match source.eval(x + y, n) {
            Ok(cdf) => jacobian * mixture::pdf(x, nl) * mixture::pdf(y, nr) * cdf,
            Err(err) => {
                failure.set(Some(err));
                f64::NAN
            }
        }
    };
    let result = config
        .cubature()
        .integrate(integrand, &[0.0, 0.0], &[1.0, 1.0], config.tolerance);
    if let Some(err) = failure.into_inner() {
        return Err(err);
    }
    let estimate = result?;
    debug!(
        "full correction({tobs}, {nl}, {nr}) = {:e} +/- {:e} ({} evaluations)",
        estimate.value, estimate.error, estimate.evaluations
    );
    Ok(estimate.value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use squares_numerics::{IntegrationError, Tolerance};

    fn config(tolerance: Tolerance, interpolation: InterpolationKind) -> SquaresConfig {
        SquaresConfig {
            tolerance,
            interpolation,
            ..Default::default()
        }
    }

    #[test]
    fn test_table_spans_statistic_to_twice() {
        let exact = ExactCdf::new();
        let table = tabulate(&exact, 4.0, 6, 5, InterpolationKind::Linear).unwrap();
        for x in [4.0, 5.0, 6.0, 7.0, 8.0] {
            let direct = exact.cumulative(x, 6).unwrap();
            assert!((table.eval(x) - direct).abs() < 1e-15);
        }
    }

    #[test]
    fn test_zero_statistic() {
        let exact = ExactCdf::new();
        let value = full_correction(&exact, 0.0, 4, 4, 10, &SquaresConfig::default()).unwrap();
        assert_eq!(value, 0.0);
    }

    #[test]
    fn test_exact_and_tabulated_agree() {
        let exact = ExactCdf::new();
        let tolerance = Tolerance::new(1e-4, 0.0);
        let run = |points, kind| {
            full_correction(&exact, 6.0, 3, 3, points, &config(tolerance, kind)).unwrap()
        };
        let direct = run(0, InterpolationKind::Linear);
        let linear = run(50, InterpolationKind::Linear);
        let steffen = run(50, InterpolationKind::Steffen);
        assert!(direct > 0.0);
        assert!((linear - direct).abs() < 1e-3 * direct, "{linear} vs {direct}");
        assert!((steffen - direct).abs() < 1e-3 * direct, "{steffen} vs {direct}");
    }

    #[test]
    fn test_starved_cubature_is_an_error() {
        let exact = ExactCdf::new();
        let starved = SquaresConfig {
            cubature_max_evaluations: 20,
            ..config(Tolerance::new(1e-12, 0.0), InterpolationKind::Linear)
        };
        let err = full_correction(&exact, 10.0, 5, 5, 8, &starved).unwrap_err();
        assert!(matches!(
            err,
            SquaresError::Integration(IntegrationError::NotConverged { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_input() {
        let exact = ExactCdf::new();
        let config = SquaresConfig::default();
        for (tobs, nl, nr) in [(-1.0, 2, 2), (f64::NAN, 2, 2), (3.0, 0, 2), (3.0, 2, 0)] {
            assert!(matches!(
                full_correction(&exact, tobs, nl, nr, 10, &config),
                Err(SquaresError::InvalidInput(_))
            ));
        }
        assert!(matches!(
            full_correction(&exact, 3.0, u32::MAX, 2, 10, &config),
            Err(SquaresError::InvalidInput(_))
        ));
    }
}
