//! Globally adaptive Gauss-Kronrod quadrature on a finite interval.
//!
//! Each subinterval is integrated with the 21-point Kronrod extension of the
//! 10-point Gauss rule; the difference between the two is the local error
//! estimate, rescaled the QUADPACK way. The subinterval with the largest
//! error is bisected until the summed error meets the [`Tolerance`] or the
//! subdivision limit is exhausted.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, warn};

use crate::{Estimate, IntegrationError, NeumaierSum, Tolerance};

/// Default maximum number of subintervals.
pub const DEFAULT_LIMIT: usize = 1000;

/// Kronrod abscissae on [0, 1]; odd indices are the Gauss nodes.
const XGK: [f64; 11] = [
    0.995_657_163_025_808_080_735_527_280_689_003,
    0.973_906_528_517_171_720_077_964_012_084_452,
    0.930_157_491_355_708_226_001_207_180_059_508,
    0.865_063_366_688_984_510_732_096_688_423_493,
    0.780_817_726_586_416_897_063_717_578_345_042,
    0.679_409_568_299_024_406_234_327_365_114_874,
    0.562_757_134_668_604_683_339_000_099_272_694,
    0.433_395_394_129_247_190_799_265_943_165_784,
    0.294_392_862_701_460_198_131_126_603_103_866,
    0.148_874_338_981_631_210_884_826_001_129_720,
    0.0,
];

/// 10-point Gauss weights.
const WG: [f64; 5] = [
    0.066_671_344_308_688_137_593_568_809_893_332,
    0.149_451_349_150_580_593_145_776_339_657_697,
    0.219_086_362_515_982_043_995_534_934_228_163,
    0.269_266_719_309_996_355_091_226_921_569_469,
    0.295_524_224_714_752_870_173_892_994_651_338,
];

/// 21-point Kronrod weights.
const WGK: [f64; 11] = [
    0.011_694_638_867_371_874_278_064_396_062_192,
    0.032_558_162_307_964_727_478_818_972_459_390,
    0.054_755_896_574_351_996_031_381_300_244_580,
    0.075_039_674_810_919_952_767_043_140_916_190,
    0.093_125_454_583_697_605_535_065_465_083_366,
    0.109_387_158_802_297_641_899_210_590_325_805,
    0.123_491_976_262_065_851_077_734_878_863_357,
    0.134_709_217_311_473_325_928_054_001_771_707,
    0.142_775_938_577_060_080_797_094_273_138_717,
    0.147_739_104_901_338_491_374_841_515_972_068,
    0.149_445_554_002_916_905_664_936_468_389_821,
];

/// Evaluations per application of the 21-point rule.
pub const RULE_POINTS: usize = 21;

/// Adaptive 1-D integrator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quadrature {
    /// Maximum number of subintervals kept in the workspace.
    pub limit: usize,
}

impl Default for Quadrature {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

/// One subinterval of the adaptive workspace, ordered by its error.
#[derive(Debug, Clone, Copy)]
struct Segment {
    a: f64,
    b: f64,
    value: f64,
    error: f64,
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Segment {}

impl PartialOrd for Segment {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Segment {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}

/// Apply the Gauss-Kronrod pair once on `[a, b]`.
fn gauss_kronrod<F>(f: &mut F, a: f64, b: f64) -> Result<Segment, IntegrationError>
where
    F: FnMut(f64) -> f64,
{
    let mut eval = |x: f64| -> Result<f64, IntegrationError> {
        let y = f(x);
        if y.is_finite() {
            Ok(y)
        } else {
            Err(IntegrationError::NonFinite {
                point: vec![x],
                value: y,
            })
        }
    };

    let center = 0.5 * (a + b);
    let half_length = 0.5 * (b - a);
    let abs_half_length = half_length.abs();

    let f_center = eval(center)?;
    let mut result_gauss = 0.0;
    let mut result_kronrod = f_center * WGK[10];
    let mut result_abs = result_kronrod.abs();
    let mut fv1 = [0.0; 10];
    let mut fv2 = [0.0; 10];

    for j in 0..5 {
        let jtw = 2 * j + 1;
        let dx = half_length * XGK[jtw];
        let f1 = eval(center - dx)?;
        let f2 = eval(center + dx)?;
        fv1[jtw] = f1;
        fv2[jtw] = f2;
        result_gauss += WG[j] * (f1 + f2);
        result_kronrod += WGK[jtw] * (f1 + f2);
        result_abs += WGK[jtw] * (f1.abs() + f2.abs());
    }

    for j in 0..5 {
        let jtwm1 = 2 * j;
        let dx = half_length * XGK[jtwm1];
        let f1 = eval(center - dx)?;
        let f2 = eval(center + dx)?;
        fv1[jtwm1] = f1;
        fv2[jtwm1] = f2;
        result_kronrod += WGK[jtwm1] * (f1 + f2);
        result_abs += WGK[jtwm1] * (f1.abs() + f2.abs());
    }

    let mean = result_kronrod * 0.5;
    let mut result_asc = WGK[10] * (f_center - mean).abs();
    for j in 0..10 {
        result_asc += WGK[j] * ((fv1[j] - mean).abs() + (fv2[j] - mean).abs());
    }

    let error = ((result_kronrod - result_gauss) * half_length).abs();
    let value = result_kronrod * half_length;
    result_abs *= abs_half_length;
    result_asc *= abs_half_length;

    Ok(Segment {
        a,
        b,
        value,
        error: rescale_error(error, result_abs, result_asc),
    })
}

/// QUADPACK heuristic: sharpen the raw Gauss/Kronrod difference and never
/// claim more accuracy than roundoff allows.
fn rescale_error(error: f64, result_abs: f64, result_asc: f64) -> f64 {
    let mut err = error;
    if result_asc != 0.0 && err != 0.0 {
        let scale = (200.0 * err / result_asc).powf(1.5);
        err = if scale < 1.0 {
            result_asc * scale
        } else {
            result_asc
        };
    }
    if result_abs > f64::MIN_POSITIVE / (50.0 * f64::EPSILON) {
        err = err.max(50.0 * f64::EPSILON * result_abs);
    }
    err
}

impl Quadrature {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Integrate `f` over `[a, b]` to the requested tolerance.
    ///
    /// `a > b` integrates over `[b, a]` and flips the sign; `a == b` is zero.
    pub fn integrate<F>(
        &self,
        mut f: F,
        a: f64,
        b: f64,
        tolerance: Tolerance,
    ) -> Result<Estimate, IntegrationError>
    where
        F: FnMut(f64) -> f64,
    {
        tolerance.validate()?;
        if !a.is_finite() || !b.is_finite() {
            return Err(IntegrationError::InvalidDomain(format!(
                "bounds must be finite, got [{a}, {b}]"
            )));
        }
        if self.limit == 0 {
            return Err(IntegrationError::InvalidDomain(
                "subinterval limit must be positive".to_string(),
            ));
        }
        if a == b {
            return Ok(Estimate {
                value: 0.0,
                error: 0.0,
                evaluations: 0,
            });
        }
        if a > b {
            let estimate = self.integrate(f, b, a, tolerance)?;
            return Ok(Estimate {
                value: -estimate.value,
                ..estimate
            });
        }

        let first = gauss_kronrod(&mut f, a, b)?;
        let mut evaluations = RULE_POINTS;
        let mut value = first.value;
        let mut error = first.error;

        let mut workspace = BinaryHeap::with_capacity(self.limit);
        workspace.push(first);

        while error > tolerance.target(value) {
            if workspace.len() >= self.limit {
                return Err(self.not_converged(&workspace, evaluations));
            }
            let Some(worst) = workspace.pop() else {
                break;
            };
            let mid = 0.5 * (worst.a + worst.b);
            if mid <= worst.a || mid >= worst.b {
                // cannot bisect any further in floating point
                workspace.push(worst);
                return Err(self.not_converged(&workspace, evaluations));
            }

            let left = gauss_kronrod(&mut f, worst.a, mid)?;
            let right = gauss_kronrod(&mut f, mid, worst.b)?;
            evaluations += 2 * RULE_POINTS;

            value += left.value + right.value - worst.value;
            error += left.error + right.error - worst.error;
            workspace.push(left);
            workspace.push(right);
        }

        // re-add from scratch to shed the drift of the running totals
        let value = workspace.iter().map(|s| s.value).collect::<NeumaierSum>().value();
        let error = workspace.iter().map(|s| s.error).sum::<f64>();
        debug!(
            "quadrature on [{a}, {b}]: {value:e} +- {error:e} with {} subintervals",
            workspace.len()
        );
        Ok(Estimate {
            value,
            error,
            evaluations,
        })
    }

    fn not_converged(&self, workspace: &BinaryHeap<Segment>, evaluations: usize) -> IntegrationError {
        let value = workspace.iter().map(|s| s.value).collect::<NeumaierSum>().value();
        let error = workspace.iter().map(|s| s.error).sum::<f64>();
        warn!(
            "quadrature stopped at {} subintervals: {value:e} +- {error:e}",
            workspace.len()
        );
        IntegrationError::NotConverged {
            value,
            error,
            evaluations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Quadrature {
        Quadrature::default()
    }

    #[test]
    fn test_polynomial_is_exact() {
        let est = quad()
            .integrate(|x| x * x * x, 0.0, 2.0, Tolerance::default())
            .unwrap();
        assert!((est.value - 4.0).abs() < 1e-14);
        assert_eq!(est.evaluations, RULE_POINTS);
    }

    #[test]
    fn test_exponential() {
        let est = quad()
            .integrate(f64::exp, 0.0, 1.0, Tolerance::default())
            .unwrap();
        assert!((est.value - (std::f64::consts::E - 1.0)).abs() < 1e-14);
    }

    #[test]
    fn test_square_root_singularity_converges() {
        // integral of 1/sqrt(x) over [0, 1] is 2
        let est = quad()
            .integrate(|x| 1.0 / x.sqrt(), 0.0, 1.0, Tolerance::new(1e-10, 0.0))
            .unwrap();
        assert!((est.value - 2.0).abs() < 1e-8, "got {}", est.value);
        assert!(est.evaluations > RULE_POINTS);
    }

    #[test]
    fn test_reversed_and_empty_interval() {
        let forward = quad().integrate(f64::sin, 0.0, 1.0, Tolerance::default()).unwrap();
        let backward = quad().integrate(f64::sin, 1.0, 0.0, Tolerance::default()).unwrap();
        assert_eq!(forward.value, -backward.value);
        let empty = quad().integrate(f64::sin, 3.0, 3.0, Tolerance::default()).unwrap();
        assert_eq!(empty.value, 0.0);
    }

    #[test]
    fn test_budget_exhaustion_is_reported() {
        let err = Quadrature::new(2)
            .integrate(|x| (1.0 / x).sin(), 1e-6, 1.0, Tolerance::new(1e-12, 0.0))
            .unwrap_err();
        match err {
            IntegrationError::NotConverged { value, error, .. } => {
                assert!(value.is_finite());
                assert!(error > 0.0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_integrand() {
        let err = quad()
            .integrate(|_| f64::NAN, 0.0, 1.0, Tolerance::default())
            .unwrap_err();
        assert!(matches!(err, IntegrationError::NonFinite { .. }));
    }

    #[test]
    fn test_invalid_tolerance() {
        let err = quad()
            .integrate(f64::sin, 0.0, 1.0, Tolerance::new(0.0, 0.0))
            .unwrap_err();
        assert!(matches!(err, IntegrationError::InvalidTolerance(_)));
    }
}
