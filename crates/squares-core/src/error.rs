//! Error type of the distribution API.

use squares_numerics::{IntegrationError, InterpolationError};
use thiserror::Error;

/// Everything that can go wrong computing a distribution value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SquaresError {
    /// Rejected before any computation started.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The exact sum left `[0, 1)`; the result cannot be trusted.
    #[error("precision loss: cumulative probability evaluated to {value}")]
    PrecisionLoss { value: f64 },
    #[error(transparent)]
    Integration(#[from] IntegrationError),
    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

pub type Result<T> = std::result::Result<T, SquaresError>;

/// Reject a statistic value that is negative, NaN or infinite.
pub(crate) fn check_statistic(tobs: f64) -> Result<()> {
    if !tobs.is_finite() || tobs < 0.0 {
        return Err(SquaresError::InvalidInput(format!(
            "statistic must be finite and non-negative, got {tobs}"
        )));
    }
    Ok(())
}

/// Reject an empty sequence length.
pub(crate) fn check_length(name: &str, n: u32) -> Result<()> {
    if n == 0 {
        return Err(SquaresError::InvalidInput(format!(
            "{name} must be at least 1"
        )));
    }
    Ok(())
}

/// Reject a block multiplier below one, NaN or infinite.
pub(crate) fn check_multiplier(n: f64) -> Result<()> {
    if !n.is_finite() || n < 1.0 {
        return Err(SquaresError::InvalidInput(format!(
            "multiplier must be finite and at least 1, got {n}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks() {
        assert!(check_statistic(0.0).is_ok());
        assert!(check_statistic(-1e-300).is_err());
        assert!(check_statistic(f64::NAN).is_err());
        assert!(check_statistic(f64::INFINITY).is_err());
        assert!(check_length("N", 1).is_ok());
        assert!(check_length("N", 0).is_err());
        assert!(check_multiplier(1.0).is_ok());
        assert!(check_multiplier(0.999).is_err());
        assert!(check_multiplier(f64::NAN).is_err());
    }

    #[test]
    fn test_integration_error_converts() {
        let err: SquaresError = IntegrationError::NotConverged {
            value: 0.5,
            error: 1e-3,
            evaluations: 10,
        }
        .into();
        assert!(matches!(err, SquaresError::Integration(_)));
        assert!(err.to_string().contains("did not converge"));
    }

    #[test]
    fn test_messages_name_the_input() {
        let err = check_length("Nl", 0).unwrap_err();
        assert_eq!(err.to_string(), "invalid input: Nl must be at least 1");
    }
}
