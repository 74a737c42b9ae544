//! Exact cumulative distribution of the weighted-runs statistic.
//!
//! For `N` observations, `F(T | N)` is a sum over the number `r` of
//! observations above expectation and the number `M` of runs they form. Each
//! `(r, M)` pair contributes a Pochhammer weight for placing the runs times a
//! sum over all partitions of `r` into exactly `M` run lengths of
//! `prod_j P(chi^2_{y_j} <= T)^{c_j} / c_j!`, normalized by `2^N - 1`.
//!
//! Everything inside a contribution is done in log space; only whole
//! contributions are exponentiated. The cost grows like the number of
//! partitions of `N`, so `N` around 100 is already expensive.

use std::f64::consts::LN_2;

use log::trace;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use squares_numerics::NeumaierSum;

use crate::cache::{LogFactorials, log_cdf_table};
use crate::error::{Result, SquaresError, check_length, check_statistic};
use crate::partition::PartitionGenerator;

/// Exact CDF evaluator. Owns the log-factorial cache so repeated calls at
/// similar `N` do not recompute it.
#[derive(Debug, Default)]
pub struct ExactCdf {
    factorials: LogFactorials,
}

impl ExactCdf {
    pub fn new() -> Self {
        Self::default()
    }

    /// The log-factorial cache shared by all calls on this evaluator.
    pub fn factorials(&self) -> &LogFactorials {
        &self.factorials
    }

    /// `F(tobs | n)`, the probability that the statistic of `n` observations
    /// does not exceed `tobs`.
    ///
    /// Returns [`SquaresError::PrecisionLoss`] if the sum reaches 1, which
    /// happens once `tobs` is so large that the p-value drops below the
    /// resolution of `f64`.
    pub fn cumulative(&self, tobs: f64, n: u32) -> Result<f64> {
        check_statistic(tobs)?;
        check_length("N", n)?;

        // grow before the parallel section; readers only from here on
        self.factorials.extend_to(n);
        let log_cdf = log_cdf_table(tobs, n);
        let log_fact = self.factorials.read();
        let log_norm = log_total_sequences(n);

        let term = |r: u32| run_length_term(r, n, &log_cdf, &log_fact, log_norm);
        #[cfg(feature = "rayon")]
        let partials: Vec<f64> = (1..=n).into_par_iter().map(term).collect();
        #[cfg(not(feature = "rayon"))]
        let partials: Vec<f64> = (1..=n).map(term).collect();

        let total = partials.into_iter().collect::<NeumaierSum>().value();
        trace!("F({tobs} | {n}) = {total:e}");
        if !(total < 1.0) {
            return Err(SquaresError::PrecisionLoss { value: total });
        }
        Ok(total)
    }

    /// `1 - F(tobs | n)`.
    pub fn pvalue(&self, tobs: f64, n: u32) -> Result<f64> {
        Ok(1.0 - self.cumulative(tobs, n)?)
    }
}

/// `ln(2^n - 1)`, exact up to `n = 63` and `n ln 2` beyond.
fn log_total_sequences(n: u32) -> f64 {
    if n <= 63 {
        (((1u64 << n) - 1) as f64).ln()
    } else {
        f64::from(n) * LN_2
    }
}

/// Contribution of all sequences with exactly `r` observations above
/// expectation. Owns its partition generator and accumulators.
fn run_length_term(r: u32, n: u32, log_cdf: &[f64], log_fact: &[f64], log_norm: f64) -> f64 {
    let mut total = NeumaierSum::new();
    let mut log_poch = 0.0;
    for m in 1..=r.min(n - r + 1) {
        log_poch += f64::from(n - r + 2 - m).ln();
        let scale = log_poch - log_norm;

        let mut partitions = NeumaierSum::new();
        let mut generator = PartitionGenerator::with_parts(r, m);
        while let Some(partition) = generator.current() {
            let log_term: f64 = partition
                .pairs()
                .map(|(part, mult)| {
                    f64::from(mult) * log_cdf[part as usize] - log_fact[mult as usize]
                })
                .sum();
            partitions.add(log_term.exp());
            generator.advance();
        }
        total.add((scale + partitions.value().ln()).exp());
    }
    total.value()
}
