//! Geometrically weighted chi-squared mixtures.
//!
//! A run that reaches a block boundary continues into the next block for a
//! geometrically distributed number of observations. Its chi-squared
//! contribution is then a mixture over degrees of freedom `1..=n` with weight
//! `2^-(i+1)` for `i < n`; the last component `i = n` takes `2^-n`. The
//! weights sum to `1/2`, the probability that the first observation of the
//! next block is above expectation at all.
//!
//! `h` is the mixture density ([`pdf`]), `H` the mixture probability of an
//! interval ([`interval`]). `H(a, b, n)` is the integral of `h` over `[a, b]`.

use squares_numerics::chisq;

/// `(dof, weight)` pairs of the mixture over `1..=n`.
pub(crate) fn weights(n: u32) -> impl Iterator<Item = (u32, f64)> {
    let mut weight = 0.5;
    (1..=n).map(move |i| {
        if i < n {
            weight *= 0.5;
        }
        (i, weight)
    })
}

/// `h(x, n)`.
pub(crate) fn pdf(x: f64, n: u32) -> f64 {
    weights(n).map(|(i, w)| w * chisq::pdf(x, i)).sum()
}

/// `H(a, b, n)`.
pub(crate) fn interval(a: f64, b: f64, n: u32) -> f64 {
    weights(n)
        .map(|(i, w)| w * (chisq::cdf(b, i) - chisq::cdf(a, i)))
        .sum()
}
