//! Monotone interpolation of tabulated data.
//!
//! Both schemes reproduce the data points exactly and never overshoot them,
//! so a monotone table yields a monotone interpolant.
//!
//! - [`InterpolationKind::Linear`]: piecewise linear.
//! - [`InterpolationKind::Steffen`]: piecewise cubic Hermite with the slope
//!   limiter of M. Steffen, "A simple method for monotonic interpolation in
//!   one dimension", Astron. Astrophys. 239 (1990) 443-450. Continuously
//!   differentiable.

use serde::{Deserialize, Serialize};

use crate::InterpolationError;

/// Interpolation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationKind {
    #[default]
    Linear,
    Steffen,
}

impl std::fmt::Display for InterpolationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => write!(f, "linear"),
            Self::Steffen => write!(f, "steffen"),
        }
    }
}

/// An interpolant over `[xs[0], xs[n-1]]`.
#[derive(Debug, Clone)]
pub struct Interpolant {
    kind: InterpolationKind,
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Node derivatives; empty for linear interpolation.
    slopes: Vec<f64>,
}

impl Interpolant {
    /// Build an interpolant through `(xs[i], ys[i])`.
    ///
    /// `xs` must be finite and strictly increasing, with at least two points.
    pub fn new(
        kind: InterpolationKind,
        xs: Vec<f64>,
        ys: Vec<f64>,
    ) -> Result<Self, InterpolationError> {
        if xs.len() != ys.len() {
            return Err(InterpolationError::LengthMismatch {
                xs: xs.len(),
                ys: ys.len(),
            });
        }
        if xs.len() < 2 {
            return Err(InterpolationError::TooFewPoints(xs.len()));
        }
        if let Some(index) = xs.iter().position(|x| !x.is_finite()) {
            return Err(InterpolationError::NotIncreasing { index });
        }
        if let Some(index) = xs.windows(2).position(|w| w[1] <= w[0]) {
            return Err(InterpolationError::NotIncreasing { index: index + 1 });
        }
        if let Some(index) = ys.iter().position(|y| !y.is_finite()) {
            return Err(InterpolationError::NonFinite { index });
        }

        let slopes = match kind {
            InterpolationKind::Linear => Vec::new(),
            InterpolationKind::Steffen => steffen_slopes(&xs, &ys),
        };
        Ok(Self {
            kind,
            xs,
            ys,
            slopes,
        })
    }

    pub fn kind(&self) -> InterpolationKind {
        self.kind
    }

    /// Interpolated value at `x`, with `x` clamped into the tabulated range.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        let x = x.clamp(self.xs[0], self.xs[n - 1]);
        // index of the interval [xs[i], xs[i + 1]] containing x
        let i = self.xs.partition_point(|&xi| xi <= x).clamp(1, n - 1) - 1;

        let h = self.xs[i + 1] - self.xs[i];
        let t = x - self.xs[i];
        let secant = (self.ys[i + 1] - self.ys[i]) / h;
        match self.kind {
            InterpolationKind::Linear => self.ys[i] + secant * t,
            InterpolationKind::Steffen => {
                let d0 = self.slopes[i];
                let d1 = self.slopes[i + 1];
                let a = (d0 + d1 - 2.0 * secant) / (h * h);
                let b = (3.0 * secant - 2.0 * d0 - d1) / h;
                ((a * t + b) * t + d0) * t + self.ys[i]
            }
        }
    }
}

/// Steffen's limited node derivatives; boundary nodes take the secant slope.
fn steffen_slopes(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let n = xs.len();
    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let s: Vec<f64> = ys
        .windows(2)
        .zip(&h)
        .map(|(w, h)| (w[1] - w[0]) / h)
        .collect();

    let mut slopes = vec![0.0; n];
    slopes[0] = s[0];
    slopes[n - 1] = s[n - 2];
    for i in 1..n - 1 {
        let p = (s[i - 1] * h[i] + s[i] * h[i - 1]) / (h[i - 1] + h[i]);
        let limit = s[i - 1].abs().min(s[i].abs()).min(0.5 * p.abs());
        slopes[i] = (sign(s[i - 1]) + sign(s[i])) * limit;
    }
    slopes
}

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
