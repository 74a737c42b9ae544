//! The [`Squares`] engine: one configuration, one log-factorial cache, every
//! distribution operation.

use log::debug;

use crate::approx::{compose, compose_continuous};
use crate::config::SquaresConfig;
use crate::correction;
use crate::delta;
use crate::error::{Result, SquaresError, check_multiplier};
use crate::exact::ExactCdf;

/// Distribution of the weighted-runs statistic.
///
/// The engine is `Sync`; share it between threads to share its cache.
#[derive(Debug, Default)]
pub struct Squares {
    config: SquaresConfig,
    exact: ExactCdf,
}

impl Squares {
    /// Engine with default tolerances and budgets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with a custom configuration, validated up front.
    pub fn with_config(config: SquaresConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            exact: ExactCdf::new(),
        })
    }

    pub fn config(&self) -> &SquaresConfig {
        &self.config
    }

    /// The exact evaluator and its cache.
    pub fn exact(&self) -> &ExactCdf {
        &self.exact
    }

    /// Exact `F(tobs | n)`.
    pub fn cumulative(&self, tobs: f64, n: u32) -> Result<f64> {
        self.exact.cumulative(tobs, n)
    }

    /// Exact `1 - F(tobs | n)`.
    pub fn pvalue(&self, tobs: f64, n: u32) -> Result<f64> {
        self.exact.pvalue(tobs, n)
    }

    /// First-order joint correction `Delta(tobs, nl, nr)`.
    pub fn delta(&self, tobs: f64, nl: u32, nr: u32) -> Result<f64> {
        delta::delta(
            tobs,
            nl,
            nr,
            &self.config.quadrature(),
            self.config.tolerance,
        )
    }

    /// `F(tobs | blocks * n)` from `F(tobs | n)` and `Delta(tobs, n, n)`.
    pub fn approx_cumulative(&self, tobs: f64, n: u32, blocks: u32) -> Result<f64> {
        if blocks == 0 {
            return Err(SquaresError::InvalidInput(
                "number of blocks must be at least 1".to_string(),
            ));
        }
        let (cumulative, delta) = self.block_terms(tobs, n)?;
        let value = compose(cumulative, delta, blocks);
        debug!("F({tobs} | {blocks} x {n}) ~ {value:e}");
        Ok(value)
    }

    pub fn approx_pvalue(&self, tobs: f64, n: u32, blocks: u32) -> Result<f64> {
        Ok(1.0 - self.approx_cumulative(tobs, n, blocks)?)
    }

    /// Like [`approx_cumulative`](Self::approx_cumulative) for a real block
    /// multiplier, e.g. `3.55` blocks of 100 for 355 observations.
    pub fn approx_cumulative_continuous(&self, tobs: f64, n: u32, blocks: f64) -> Result<f64> {
        check_multiplier(blocks)?;
        let (cumulative, delta) = self.block_terms(tobs, n)?;
        let value = compose_continuous(cumulative, delta, blocks);
        debug!("F({tobs} | {blocks} x {n}) ~ {value:e}");
        Ok(value)
    }

    pub fn approx_pvalue_continuous(&self, tobs: f64, n: u32, blocks: f64) -> Result<f64> {
        Ok(1.0 - self.approx_cumulative_continuous(tobs, n, blocks)?)
    }

    /// Two-dimensional correction for joining blocks of `nl` and `nr`.
    ///
    /// With `interpolation_points >= 2` the exact CDF inside the integrand is
    /// replaced by an interpolant on that many nodes; otherwise it is
    /// evaluated exactly at every cubature point, which is far slower.
    pub fn full_correction(
        &self,
        tobs: f64,
        nl: u32,
        nr: u32,
        interpolation_points: usize,
    ) -> Result<f64> {
        correction::full_correction(
            &self.exact,
            tobs,
            nl,
            nr,
            interpolation_points,
            &self.config,
        )
    }

    fn block_terms(&self, tobs: f64, n: u32) -> Result<(f64, f64)> {
        let cumulative = self.cumulative(tobs, n)?;
        let delta = self.delta(tobs, n, n)?;
        Ok((cumulative, delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tolerance;

    #[test]
    fn test_engine_is_shareable() {
        fn assert_sync<T: Send + Sync>() {}
        assert_sync::<Squares>();
    }

    #[test]
    fn test_with_config_validates() {
        let bad = SquaresConfig {
            tolerance: Tolerance::new(-1.0, 0.0),
            ..Default::default()
        };
        assert!(Squares::with_config(bad).is_err());
        assert!(Squares::with_config(SquaresConfig::default()).is_ok());
    }

    #[test]
    fn test_two_blocks_match_closed_form() {
        let squares = Squares::new();
        let f = squares.cumulative(15.5, 12).unwrap();
        let delta = squares.delta(15.5, 12, 12).unwrap();
        let expected = f * f / (1.0 + delta);
        let approx = squares.approx_cumulative(15.5, 12, 2).unwrap();
        assert!((approx - expected).abs() < 1e-15);
        let continuous = squares.approx_cumulative_continuous(15.5, 12, 2.0).unwrap();
        assert!((continuous - expected).abs() < 1e-14);
    }

    #[test]
    fn test_one_block_is_exact() {
        let squares = Squares::new();
        let exact = squares.cumulative(9.0, 10).unwrap();
        assert_eq!(squares.approx_cumulative(9.0, 10, 1).unwrap(), exact);
        assert_eq!(squares.approx_pvalue(9.0, 10, 1).unwrap(), 1.0 - exact);
    }

    #[test]
    fn test_pvalues_complement() {
        let squares = Squares::new();
        let c = squares.approx_cumulative_continuous(12.0, 8, 2.5).unwrap();
        let p = squares.approx_pvalue_continuous(12.0, 8, 2.5).unwrap();
        assert!((c + p - 1.0).abs() < 1e-15);
    }

    #[test]
    fn test_huge_block_count_stays_a_probability() {
        let squares = Squares::new();
        let value = squares.approx_cumulative(30.0, 20, 3_000_000_000).unwrap();
        assert!((0.0..1.0).contains(&value), "{value}");
        let p = squares.approx_pvalue(30.0, 20, 3_000_000_000).unwrap();
        assert!((0.0..=1.0).contains(&p), "{p}");
    }

    #[test]
    fn test_rejects_bad_multipliers() {
        let squares = Squares::new();
        assert!(matches!(
            squares.approx_cumulative(5.0, 10, 0),
            Err(SquaresError::InvalidInput(_))
        ));
        assert!(matches!(
            squares.approx_cumulative_continuous(5.0, 10, 0.5),
            Err(SquaresError::InvalidInput(_))
        ));
        assert!(matches!(
            squares.approx_cumulative_continuous(5.0, 10, f64::INFINITY),
            Err(SquaresError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_statistic_everywhere() {
        let squares = Squares::new();
        assert_eq!(squares.approx_cumulative(0.0, 10, 3).unwrap(), 0.0);
        assert_eq!(squares.approx_cumulative_continuous(0.0, 10, 3.3).unwrap(), 0.0);
        assert_eq!(squares.delta(0.0, 10, 10).unwrap(), 0.0);
        assert_eq!(squares.full_correction(0.0, 10, 10, 20).unwrap(), 0.0);
    }
}
