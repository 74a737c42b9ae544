//! Globally adaptive cubature on hyper-rectangles.
//!
//! Every region is integrated with the Genz-Malik embedded rule pair of
//! degree 7 and 5; their difference is the local error estimate. The region
//! with the largest error is bisected along the axis whose fourth divided
//! difference is largest, until the summed error meets the [`Tolerance`] or
//! the evaluation budget runs out.
//!
//! Reference: A. C. Genz and A. A. Malik, "An adaptive algorithm for numerical
//! integration over an N-dimensional rectangular region", J. Comput. Appl.
//! Math. 6 (1980) 295-302.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use log::{debug, warn};

use crate::{Estimate, IntegrationError, NeumaierSum, Quadrature, Tolerance};

/// Default evaluation budget.
pub const DEFAULT_MAX_EVALUATIONS: usize = 100_000;

/// Largest supported dimension; the rule needs `2^dim` corner points.
pub const MAX_DIMENSION: usize = 15;

const LAMBDA2: f64 = 0.358_568_582_800_318_091_990_645_153_907_937_495_454_1;
const LAMBDA4: f64 = 0.948_683_298_050_513_799_599_668_063_329_815_560_116_0;
const LAMBDA5: f64 = 0.688_247_201_611_685_297_721_628_734_293_623_525_126_9;

/// Adaptive multidimensional integrator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cubature {
    /// Integrand evaluations allowed before giving up.
    pub max_evaluations: usize,
}

impl Default for Cubature {
    fn default() -> Self {
        Self {
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        }
    }
}

#[derive(Debug, Clone)]
struct Region {
    center: Vec<f64>,
    half_width: Vec<f64>,
    value: f64,
    error: f64,
    split_axis: usize,
}

impl PartialEq for Region {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Region {}

impl PartialOrd for Region {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Region {
    fn cmp(&self, other: &Self) -> Ordering {
        self.error.total_cmp(&other.error)
    }
}

/// Genz-Malik weights for a fixed dimension.
#[derive(Debug, Clone, Copy)]
struct GenzMalik {
    dim: usize,
    w1: f64,
    w2: f64,
    w3: f64,
    w4: f64,
    w5: f64,
    we1: f64,
    we2: f64,
    we3: f64,
    we4: f64,
}

impl GenzMalik {
    fn new(dim: usize) -> Self {
        let n = dim as f64;
        Self {
            dim,
            w1: (12824.0 - 9120.0 * n + 400.0 * n * n) / 19683.0,
            w2: 980.0 / 6561.0,
            w3: (1820.0 - 400.0 * n) / 19683.0,
            w4: 200.0 / 19683.0,
            w5: 6859.0 / 19683.0 / (1u64 << dim) as f64,
            we1: (729.0 - 950.0 * n + 50.0 * n * n) / 729.0,
            we2: 245.0 / 486.0,
            we3: (265.0 - 100.0 * n) / 1458.0,
            we4: 25.0 / 729.0,
        }
    }

    /// Number of integrand evaluations per region.
    fn points(&self) -> usize {
        let n = self.dim;
        1 + 4 * n + 2 * n * (n - 1) + (1 << n)
    }

    fn evaluate<F>(
        &self,
        f: &mut F,
        center: Vec<f64>,
        half_width: Vec<f64>,
    ) -> Result<Region, IntegrationError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let dim = self.dim;
        let mut point = center.clone();
        let mut eval = |p: &[f64]| -> Result<f64, IntegrationError> {
            let y = f(p);
            if y.is_finite() {
                Ok(y)
            } else {
                Err(IntegrationError::NonFinite {
                    point: p.to_vec(),
                    value: y,
                })
            }
        };

        let f1 = eval(&point)?;
        let ratio = (LAMBDA2 * LAMBDA2) / (LAMBDA4 * LAMBDA4);

        let mut sum2 = 0.0;
        let mut sum3 = 0.0;
        let mut max_diff = -1.0;
        let mut split_axis = 0;
        for i in 0..dim {
            let c = center[i];
            let h = half_width[i];

            point[i] = c - LAMBDA2 * h;
            let f2a = eval(&point)?;
            point[i] = c + LAMBDA2 * h;
            let f2b = eval(&point)?;
            point[i] = c - LAMBDA4 * h;
            let f3a = eval(&point)?;
            point[i] = c + LAMBDA4 * h;
            let f3b = eval(&point)?;
            point[i] = c;

            let f2 = f2a + f2b;
            let f3 = f3a + f3b;
            sum2 += f2;
            sum3 += f3;

            // fourth divided difference along axis i
            let diff = (f3 - 2.0 * f1 - ratio * (f2 - 2.0 * f1)).abs();
            let wider = h > half_width[split_axis];
            if diff > max_diff * (1.0 + 1e-10) || (diff >= max_diff * (1.0 - 1e-10) && wider) {
                max_diff = diff;
                split_axis = i;
            }
        }

        let mut sum4 = 0.0;
        for i in 0..dim {
            for j in (i + 1)..dim {
                for (si, sj) in [(-1.0, -1.0), (-1.0, 1.0), (1.0, -1.0), (1.0, 1.0)] {
                    point[i] = center[i] + si * LAMBDA4 * half_width[i];
                    point[j] = center[j] + sj * LAMBDA4 * half_width[j];
                    sum4 += eval(&point)?;
                }
                point[i] = center[i];
                point[j] = center[j];
            }
        }

        let mut sum5 = 0.0;
        for corner in 0..(1usize << dim) {
            for (k, p) in point.iter_mut().enumerate() {
                let sign = if corner >> k & 1 == 1 { 1.0 } else { -1.0 };
                *p = center[k] + sign * LAMBDA5 * half_width[k];
            }
            sum5 += eval(&point)?;
        }

        let volume: f64 = half_width.iter().map(|h| 2.0 * h).product();
        let degree7 = self.w1 * f1 + self.w2 * sum2 + self.w3 * sum3 + self.w4 * sum4 + self.w5 * sum5;
        let degree5 = self.we1 * f1 + self.we2 * sum2 + self.we3 * sum3 + self.we4 * sum4;

        Ok(Region {
            center,
            half_width,
            value: volume * degree7,
            error: (volume * (degree7 - degree5)).abs(),
            split_axis,
        })
    }
}

impl Cubature {
    pub fn new(max_evaluations: usize) -> Self {
        Self { max_evaluations }
    }

    /// Integrate `f` over the box `[lower[i], upper[i]]`.
    ///
    /// One-dimensional boxes are delegated to [`Quadrature`].
    pub fn integrate<F>(
        &self,
        mut f: F,
        lower: &[f64],
        upper: &[f64],
        tolerance: Tolerance,
    ) -> Result<Estimate, IntegrationError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        tolerance.validate()?;
        let dim = lower.len();
        if dim != upper.len() {
            return Err(IntegrationError::InvalidDomain(format!(
                "bounds differ in dimension: {} vs {}",
                lower.len(),
                upper.len()
            )));
        }
        if dim == 0 || dim > MAX_DIMENSION {
            return Err(IntegrationError::InvalidDomain(format!(
                "dimension must be in 1..={MAX_DIMENSION}, got {dim}"
            )));
        }
        if lower.iter().chain(upper).any(|x| !x.is_finite()) {
            return Err(IntegrationError::InvalidDomain(
                "bounds must be finite".to_string(),
            ));
        }
        if dim == 1 {
            let limit = (self.max_evaluations / crate::quadrature::RULE_POINTS).max(1);
            return Quadrature::new(limit).integrate(|x| f(&[x]), lower[0], upper[0], tolerance);
        }
        if lower.iter().zip(upper).any(|(a, b)| a == b) {
            return Ok(Estimate {
                value: 0.0,
                error: 0.0,
                evaluations: 0,
            });
        }

        // orientation of each axis enters as the sign of the volume
        let sign: f64 = lower
            .iter()
            .zip(upper)
            .map(|(a, b)| if a > b { -1.0 } else { 1.0 })
            .product();
        let center: Vec<f64> = lower.iter().zip(upper).map(|(a, b)| 0.5 * (a + b)).collect();
        let half_width: Vec<f64> = lower
            .iter()
            .zip(upper)
            .map(|(a, b)| 0.5 * (b - a).abs())
            .collect();

        let rule = GenzMalik::new(dim);
        let points = rule.points();

        let first = rule.evaluate(&mut f, center, half_width)?;
        let mut evaluations = points;
        let mut value = first.value;
        let mut error = first.error;
        let mut regions = BinaryHeap::new();
        regions.push(first);

        while error > tolerance.target(value) {
            if evaluations + 2 * points > self.max_evaluations {
                let (value, error) = totals(&regions);
                warn!(
                    "cubature stopped at {evaluations} evaluations: {value:e} +- {error:e}"
                );
                return Err(IntegrationError::NotConverged {
                    value: sign * value,
                    error,
                    evaluations,
                });
            }
            let Some(worst) = regions.pop() else {
                break;
            };

            let axis = worst.split_axis;
            let mut half_width = worst.half_width.clone();
            half_width[axis] *= 0.5;
            let mut left_center = worst.center.clone();
            left_center[axis] -= half_width[axis];
            let mut right_center = worst.center;
            right_center[axis] += half_width[axis];

            let left = rule.evaluate(&mut f, left_center, half_width.clone())?;
            let right = rule.evaluate(&mut f, right_center, half_width)?;
            evaluations += 2 * points;

            value += left.value + right.value - worst.value;
            error += left.error + right.error - worst.error;
            regions.push(left);
            regions.push(right);
        }

        let (value, error) = totals(&regions);
        debug!(
            "cubature in {dim}d: {value:e} +- {error:e} with {evaluations} evaluations over {} regions",
            regions.len()
        );
        Ok(Estimate {
            value: sign * value,
            error,
            evaluations,
        })
    }
}

fn totals(regions: &BinaryHeap<Region>) -> (f64, f64) {
    let value = regions.iter().map(|r| r.value).collect::<NeumaierSum>().value();
    let error = regions.iter().map(|r| r.error).sum::<f64>();
    (value, error)
}
