//! # squares-core
//!
//! **Exact and approximate p-values for the weighted-runs statistic.**
//!
//! The weighted-runs (SQUARES) statistic `T` of a sequence of `N` normalized
//! residuals is the largest sum of squares over any run of consecutive
//! residuals above expectation. Unlike the plain chi-squared, it notices a
//! model that is off in a localized region of the data.
//!
//! ## Quick Start
//!
//! ```
//! use squares_core::Squares;
//!
//! let squares = Squares::new();
//!
//! // exact p-value for 20 observations
//! let p = squares.pvalue(10.0, 20).unwrap();
//! assert!((p - 0.06934906413527009).abs() < 1e-13);
//!
//! // 5 * 12 = 60 observations from blocks of 12
//! let approx = squares.approx_pvalue(15.5, 12, 5).unwrap();
//! assert!(approx > 0.0 && approx < 1.0);
//! ```
//!
//! ## Architecture
//!
//! Partitions + log caches → exact CDF `F(T | N)` → Delta / full correction →
//! approximate `F(T | n N)`
//!
//! - **Exact**: a sum over all partitions of every run length. Costs grow
//!   like the partition numbers, so it is practical up to `N` around 100.
//! - **Approximate**: `n` blocks of `N`, joined with the first-order
//!   correction `Delta` (one-dimensional quadrature).
//! - **Full correction**: the joint correction without the first-order
//!   factorization, as a two-dimensional cubature.
//!
//! The free functions below build a fresh [`Squares`] per call. Keep an
//! engine around to reuse its log-factorial cache.

pub mod approx;
pub mod cache;
pub mod config;
mod correction;
mod delta;
pub mod engine;
pub mod error;
pub mod exact;
mod mixture;
pub mod partition;

pub use cache::LogFactorials;
pub use config::{InterpolationKind, SquaresConfig, Tolerance};
pub use engine::Squares;
pub use error::{Result, SquaresError};
pub use exact::ExactCdf;
pub use partition::{Constraint, Partition, PartitionGenerator};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn engine_with(tolerance: Tolerance) -> Result<Squares> {
    Squares::with_config(SquaresConfig {
        tolerance,
        ..Default::default()
    })
}

/// Exact `F(tobs | n)` for `n` observations.
pub fn cumulative(tobs: f64, n: u32) -> Result<f64> {
    Squares::new().cumulative(tobs, n)
}

/// Exact p-value `1 - F(tobs | n)`.
pub fn pvalue(tobs: f64, n: u32) -> Result<f64> {
    Squares::new().pvalue(tobs, n)
}

/// `F(tobs | blocks * n)` approximated from blocks of `n`.
pub fn approx_cumulative(tobs: f64, n: u32, blocks: u32, tolerance: Tolerance) -> Result<f64> {
    engine_with(tolerance)?.approx_cumulative(tobs, n, blocks)
}

pub fn approx_pvalue(tobs: f64, n: u32, blocks: u32, tolerance: Tolerance) -> Result<f64> {
    engine_with(tolerance)?.approx_pvalue(tobs, n, blocks)
}

/// `F(tobs | blocks * n)` for a real number of blocks.
pub fn approx_cumulative_continuous(
    tobs: f64,
    n: u32,
    blocks: f64,
    tolerance: Tolerance,
) -> Result<f64> {
    engine_with(tolerance)?.approx_cumulative_continuous(tobs, n, blocks)
}

pub fn approx_pvalue_continuous(
    tobs: f64,
    n: u32,
    blocks: f64,
    tolerance: Tolerance,
) -> Result<f64> {
    engine_with(tolerance)?.approx_pvalue_continuous(tobs, n, blocks)
}

/// First-order correction for joining blocks of `nl` and `nr` observations.
pub fn delta(tobs: f64, nl: u32, nr: u32, tolerance: Tolerance) -> Result<f64> {
    engine_with(tolerance)?.delta(tobs, nl, nr)
}

/// Two-dimensional correction for joining blocks of `nl` and `nr`; see
/// [`Squares::full_correction`].
pub fn full_correction(
    tobs: f64,
    nl: u32,
    nr: u32,
    tolerance: Tolerance,
    interpolation_points: usize,
) -> Result<f64> {
    engine_with(tolerance)?.full_correction(tobs, nl, nr, interpolation_points)
}
