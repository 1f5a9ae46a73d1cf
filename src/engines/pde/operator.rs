//! Composite spatial operators consumed by the time-stepping schemes.
//!
//! Sign convention: an operator `L` describes the backward evolution
//! `dV/dτ = L V`, so a scheme stepping from `t` to `t - dt` solves
//! `(I - θ·dt·L) x = a` for its implicit part.

use std::sync::Arc;

use crate::core::{Array, FdmError, check_len};

use super::fd_common::solve_tridiagonal_inplace;

/// Discretized multi-dimensional PDE operator with a per-dimension splitting.
///
/// All methods take `&self`; operators whose coefficients depend on time keep
/// that state behind interior mutability and update it in [`set_time`].
///
/// [`set_time`]: FdmLinearOpComposite::set_time
pub trait FdmLinearOpComposite {
    /// Number of spatial dimensions (splitting directions).
    fn size(&self) -> usize;

    /// Freezes time-dependent coefficients on `[t1, t2]`.
    fn set_time(&self, t1: f64, t2: f64);

    /// Full operator `L r`.
    fn apply(&self, r: &Array) -> Result<Array, FdmError>;

    /// Cross-derivative part of the operator.
    fn apply_mixed(&self, r: &Array) -> Result<Array, FdmError>;

    /// Operator restricted to `direction`, `L_i r`.
    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array, FdmError>;

    /// Solves `(I + s·L_i) x = r` for one direction.
    fn solve_splitting(&self, direction: usize, r: &Array, s: f64) -> Result<Array, FdmError>;

    /// Approximate inverse of `I + s·L`, used to precondition Krylov solves.
    fn preconditioner(&self, r: &Array, s: f64) -> Result<Array, FdmError>;
}

/// Shared handle to a composite operator.
pub type SharedOperator = Arc<dyn FdmLinearOpComposite>;

/// One-dimensional operator with three bands.
///
/// Row `i` computes `lower[i]·r[i-1] + diag[i]·r[i] + upper[i]·r[i+1]`;
/// `lower[0]` and `upper[n-1]` are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct TripleBandOp {
    lower: Vec<f64>,
    diag: Vec<f64>,
    upper: Vec<f64>,
}

impl TripleBandOp {
    pub fn new(lower: Vec<f64>, diag: Vec<f64>, upper: Vec<f64>) -> Result<Self, FdmError> {
        let n = diag.len();
        if n == 0 {
            return Err(FdmError::InvalidInput(
                "triple band operator must not be empty".to_string(),
            ));
        }
        check_len("triple band lower", n, lower.len())?;
        check_len("triple band upper", n, upper.len())?;
        if lower
            .iter()
            .chain(&diag)
            .chain(&upper)
            .any(|c| !c.is_finite())
        {
            return Err(FdmError::InvalidInput(
                "triple band coefficients must be finite".to_string(),
            ));
        }
        Ok(Self { lower, diag, upper })
    }

    /// Operator with the same stencil `(lo, mid, hi)` on every row.
    pub fn uniform(n: usize, lo: f64, mid: f64, hi: f64) -> Result<Self, FdmError> {
        Self::new(vec![lo; n], vec![mid; n], vec![hi; n])
    }

    pub fn len(&self) -> usize {
        self.diag.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diag.is_empty()
    }

    /// `L r` without boundary bookkeeping.
    pub fn mult(&self, r: &Array) -> Result<Array, FdmError> {
        let n = self.len();
        check_len("triple band apply", n, r.len())?;
        let mut out = Array::zeros(n);
        for i in 0..n {
            let mut acc = self.diag[i] * r[i];
            if i > 0 {
                acc = self.lower[i].mul_add(r[i - 1], acc);
            }
            if i + 1 < n {
                acc = self.upper[i].mul_add(r[i + 1], acc);
            }
            out[i] = acc;
        }
        Ok(out)
    }

    /// Solves `(I + s·L) x = r` with the Thomas algorithm.
    pub fn solve(&self, r: &Array, s: f64) -> Result<Array, FdmError> {
        let n = self.len();
        check_len("triple band solve", n, r.len())?;

        let mut lower: Vec<f64> = self.lower.iter().map(|c| s * c).collect();
        let diag: Vec<f64> = self.diag.iter().map(|c| s.mul_add(*c, 1.0)).collect();
        let mut upper: Vec<f64> = self.upper.iter().map(|c| s * c).collect();
        lower[0] = 0.0;
        upper[n - 1] = 0.0;

        let mut c_star = vec![0.0_f64; n];
        let mut d_star = vec![0.0_f64; n];
        let mut out = vec![0.0_f64; n];
        solve_tridiagonal_inplace(
            &lower,
            &diag,
            &upper,
            r.as_slice(),
            &mut c_star,
            &mut d_star,
            &mut out,
        )?;
        Ok(Array::from_vec(out))
    }
}

impl FdmLinearOpComposite for TripleBandOp {
    fn size(&self) -> usize {
        1
    }

    fn set_time(&self, _t1: f64, _t2: f64) {}

    fn apply(&self, r: &Array) -> Result<Array, FdmError> {
        self.mult(r)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array, FdmError> {
        check_len("triple band apply_mixed", self.len(), r.len())?;
        Ok(Array::zeros(r.len()))
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array, FdmError> {
        match direction {
            0 => self.mult(r),
            _ => Ok(Array::zeros(r.len())),
        }
    }

    fn solve_splitting(&self, direction: usize, r: &Array, s: f64) -> Result<Array, FdmError> {
        match direction {
            0 => self.solve(r, s),
            _ => Ok(r.clone()),
        }
    }

    fn preconditioner(&self, r: &Array, s: f64) -> Result<Array, FdmError> {
        self.solve(r, s)
    }
}
