//! Approximate CDF for long sequences.
//!
//! A sequence of `n * N` observations is treated as `n` blocks of `N`. If the
//! blocks were independent the CDF would be `F(T | N)^n`; each of the `n - 1`
//! joints adds a chance `Delta` that a run straddling it exceeds `T`.
//!
//! - integer `n`: `F^n / (1 + (n - 1) Delta)`
//! - real `n`: `F * F^(n-1) / (1 + Delta (1 - F^(n-1)) / (1 - F))`
//!
//! The two agree for `n = 1` and `n = 2`. The real form lets a length that is
//! not a multiple of a convenient block size be handled by a fractional `n`.

/// Compose `F(T | N)` and `Delta(T, N, N)` into `F(T | n N)`.
pub fn compose(cumulative: f64, delta: f64, n: u32) -> f64 {
    let joints = f64::from(n.saturating_sub(1));
    cumulative.powf(f64::from(n)) / (1.0 + joints * delta)
}

/// Compose for a real block multiplier `n >= 1`.
pub fn compose_continuous(cumulative: f64, delta: f64, n: f64) -> f64 {
    if cumulative == 0.0 {
        return 0.0;
    }
    let extra = (n - 1.0) * cumulative.ln();
    // F^(n-1)
    let tail = extra.exp();
    // (1 - F^(n-1)) / (1 - F), the geometric series 1 + F + ... continued to real n
    let joints = if cumulative < 1.0 {
        -extra.exp_m1() / (1.0 - cumulative)
    } else {
        n - 1.0
    };
    cumulative * tail / (1.0 + delta * joints)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_block_is_identity() {
        for f in [0.0, 0.3, 0.999] {
            assert_eq!(compose(f, 0.01, 1), f);
            assert!((compose_continuous(f, 0.01, 1.0) - f).abs() < 1e-16);
        }
    }

    #[test]
    fn test_two_blocks_agree() {
        let (f, delta) = (0.97, 0.0017);
        let expected = f * f / (1.0 + delta);
        assert!((compose(f, delta, 2) - expected).abs() < 1e-16);
        assert!((compose_continuous(f, delta, 2.0) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_integer_form() {
        let (f, delta) = (0.9, 0.01);
        let expected = 0.9f64.powi(4) / 1.03;
        assert!((compose(f, delta, 4) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_continuous_limit_at_one() {
        assert_eq!(compose_continuous(1.0, 0.5, 3.0), 1.0 / 2.0);
    }

    #[test]
    fn test_continuous_is_monotone_in_n() {
        let (f, delta) = (0.999, 0.001);
        let values: Vec<f64> = [1.0, 1.5, 2.0, 3.55, 5.0]
            .iter()
            .map(|&n| compose_continuous(f, delta, n))
            .collect();
        for w in values.windows(2) {
            assert!(w[1] < w[0]);
        }
    }

    #[test]
    fn test_block_counts_beyond_i32() {
        let n = 3_000_000_000;
        let value = compose(0.999, 1e-4, n);
        assert!((0.0..1.0).contains(&value), "{value}");
        assert_eq!(compose(1.0, 0.0, u32::MAX), 1.0);
        assert!(compose(0.999_999_999_9, 0.0, u32::MAX) < 1.0);
    }

    #[test]
    fn test_zero_cumulative() {
        assert_eq!(compose(0.0, 0.0, 3), 0.0);
        assert_eq!(compose_continuous(0.0, 0.0, 2.5), 0.0);
    }
}
