//! Matrix-free linear operators.
//!
//! Krylov solvers only ever need the action `x -> A x`, so the matrix is never
//! materialized. Closures, preconditioners and scheme-internal operators all
//! implement [`LinearOperator`] and are interchangeable.

use nalgebra::DMatrix;

use crate::core::{Array, FdmError, check_len};

/// Action of a linear map on a vector.
pub trait LinearOperator {
    /// Returns `A x`.
    fn apply(&self, x: &Array) -> Result<Array, FdmError>;
}

impl<F> LinearOperator for F
where
    F: Fn(&Array) -> Result<Array, FdmError>,
{
    #[inline]
    fn apply(&self, x: &Array) -> Result<Array, FdmError> {
        self(x)
    }
}

/// The identity map.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityOperator;

impl LinearOperator for IdentityOperator {
    #[inline]
    fn apply(&self, x: &Array) -> Result<Array, FdmError> {
        Ok(x.clone())
    }
}

/// Dense square matrix viewed as an operator.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixOperator {
    matrix: DMatrix<f64>,
}

impl MatrixOperator {
    pub fn new(matrix: DMatrix<f64>) -> Result<Self, FdmError> {
        if !matrix.is_square() {
            return Err(FdmError::InvalidInput(format!(
                "operator matrix must be square, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        Ok(Self { matrix })
    }

    /// Diagonal operator `diag(d)`.
    pub fn diagonal(d: &[f64]) -> Self {
        Self {
            matrix: DMatrix::from_diagonal(&Array::from_column_slice(d)),
        }
    }

    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

impl LinearOperator for MatrixOperator {
    fn apply(&self, x: &Array) -> Result<Array, FdmError> {
        check_len("matrix operator", self.dim(), x.len())?;
        Ok(&self.matrix * x)
    }
}
