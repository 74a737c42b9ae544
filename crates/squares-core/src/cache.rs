//! Log-space tables feeding the exact engine.
//!
//! - [`LogFactorials`]: `ln(i!)`, grown on demand and shared across calls.
//! - [`log_cdf_table`]: `ln P(chi^2_i <= t)` for `i = 1..=n`, built per call.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use log::trace;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use squares_numerics::chisq;
use statrs::function::factorial::ln_factorial;

/// Append-only table of `ln(i!)` for `i = 0..=cached_up_to()`.
///
/// Growth takes the write lock; readers hold a read guard for the whole
/// parallel section of a computation, so the table never changes under them.
#[derive(Debug)]
pub struct LogFactorials {
    values: RwLock<Vec<f64>>,
}

impl Default for LogFactorials {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFactorials {
    /// A table holding only `ln(0!) = 0`.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(vec![0.0]),
        }
    }

    /// Largest `n` with `ln(n!)` cached; `0` right after construction.
    pub fn cached_up_to(&self) -> u32 {
        // the table always holds ln(0!)
        (self.read().len() - 1) as u32
    }

    /// Make sure `ln(n!)` is cached. Entries already present are untouched.
    pub fn extend_to(&self, n: u32) {
        let needed = n as usize + 1;
        if self.read().len() >= needed {
            return;
        }
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        let start = values.len();
        // another writer may have grown the table in the meantime
        if start >= needed {
            return;
        }
        values.extend((start..needed).map(|i| ln_factorial(i as u64)));
        trace!("log-factorial cache grown from {start} to {needed} entries");
    }

    /// `ln(i!)` if cached.
    pub fn get(&self, i: usize) -> Option<f64> {
        self.read().get(i).copied()
    }

    /// Shared view of the table. Holding it blocks [`extend_to`](Self::extend_to).
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<f64>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `ln P(chi^2_i <= tobs)` for `i = 1..=n`, indexed by `i`.
///
/// Slot 0 holds NaN so that an off-by-one lookup poisons the result instead
/// of silently contributing.
pub fn log_cdf_table(tobs: f64, n: u32) -> Vec<f64> {
    let log_cdf = |dof: u32| chisq::cdf(tobs, dof).ln();

    #[cfg(feature = "rayon")]
    let entries: Vec<f64> = (1..=n).into_par_iter().map(log_cdf).collect();
    #[cfg(not(feature = "rayon"))]
    let entries: Vec<f64> = (1..=n).map(log_cdf).collect();

    let mut table = Vec::with_capacity(n as usize + 1);
    table.push(f64::NAN);
    table.extend(entries);
    table
}
