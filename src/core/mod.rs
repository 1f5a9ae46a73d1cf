//! Core types shared by the linear solvers and time-stepping schemes: the state
//! vector alias, the crate-wide error, and solver-selection settings.

use nalgebra::DVector;

pub mod types;

pub use types::*;

/// Dense state vector threaded through solvers and schemes.
pub type Array = DVector<f64>;

/// Solver and scheme errors surfaced by the API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FdmError {
    /// Precondition violation (bad step, dimension mismatch, unknown selector).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Non-convergence in an iterative algorithm.
    #[error("convergence failure: {0}")]
    ConvergenceFailure(String),
    /// Numerical issue (singular system, non-finite pivot, step underflow).
    #[error("numerical error: {0}")]
    NumericalError(String),
}

/// Fails when `x` and `y` do not have the same length.
pub(crate) fn check_len(what: &str, expected: usize, got: usize) -> Result<(), FdmError> {
    if expected != got {
        return Err(FdmError::InvalidInput(format!(
            "{what}: dimension mismatch, expected {expected} got {got}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_category() {
        let err = FdmError::ConvergenceFailure("could not converge".to_string());
        assert_eq!(err.to_string(), "convergence failure: could not converge");
        let err = FdmError::InvalidInput("bad".to_string());
        assert_eq!(err.to_string(), "invalid input: bad");
    }

    #[test]
    fn check_len_rejects_mismatch() {
        assert!(check_len("rhs", 3, 3).is_ok());
        assert!(matches!(
            check_len("rhs", 3, 4),
            Err(FdmError::InvalidInput(msg)) if msg.contains("expected 3 got 4")
        ));
    }
}
