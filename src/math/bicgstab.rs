//! Preconditioned bi-conjugate gradient stabilized method (van der Vorst, 1992).
//!
//! General-purpose Krylov solver for non-symmetric systems `A x = b`. Each
//! iteration costs two operator applications and two preconditioner
//! applications; memory is a fixed handful of vectors.
//!
//! Breakdown (`ρ = r̃·r = 0`, `ω = 0` or `r̃·v = 0`) ends the iteration. It is
//! only an error when the residual target was not met at that point.

use crate::core::{Array, FdmError, check_len};

use super::linear_operator::LinearOperator;

/// Outcome of a successful BiCGStab solve.
#[derive(Debug, Clone, PartialEq)]
pub struct BiCGStabResult {
    /// Completed iterations.
    pub iterations: usize,
    /// Final relative residual `‖r‖ / ‖b‖`.
    pub error: f64,
    /// Solution vector.
    pub x: Array,
}

/// BiCGStab solver bound to an operator and optional preconditioner.
pub struct BiCGStab<'a> {
    a: &'a dyn LinearOperator,
    max_iter: usize,
    rel_tol: f64,
    preconditioner: Option<&'a dyn LinearOperator>,
}

impl<'a> BiCGStab<'a> {
    pub fn new(a: &'a dyn LinearOperator, max_iter: usize, rel_tol: f64) -> Self {
        Self {
            a,
            max_iter,
            rel_tol,
            preconditioner: None,
        }
    }

    /// Sets the right preconditioner `M ≈ A⁻¹`.
    pub fn with_preconditioner(mut self, preconditioner: &'a dyn LinearOperator) -> Self {
        self.preconditioner = Some(preconditioner);
        self
    }

    fn precondition(&self, x: &Array) -> Result<Array, FdmError> {
        match self.preconditioner {
            Some(m) => m.apply(x),
            None => Ok(x.clone()),
        }
    }

    fn apply_a(&self, x: &Array) -> Result<Array, FdmError> {
        let y = self.a.apply(x)?;
        check_len("bicgstab operator output", x.len(), y.len())?;
        Ok(y)
    }

    /// Solves `A x = b` starting from `x0` (zero when `None`).
    pub fn solve(&self, b: &Array, x0: Option<&Array>) -> Result<BiCGStabResult, FdmError> {
        if !self.rel_tol.is_finite() || self.rel_tol <= 0.0 {
            return Err(FdmError::InvalidInput(
                "rel_tol must be finite and > 0".to_string(),
            ));
        }

        let b_norm = b.norm();
        if b_norm == 0.0 {
            return Ok(BiCGStabResult {
                iterations: 0,
                error: 0.0,
                x: b.clone(),
            });
        }

        let mut x = match x0 {
            Some(x0) => {
                check_len("bicgstab initial guess", b.len(), x0.len())?;
                x0.clone()
            }
            None => Array::zeros(b.len()),
        };

        let mut r = b - self.apply_a(&x)?;
        let r_tld = r.clone();

        let mut p = Array::zeros(b.len());
        let mut v = Array::zeros(b.len());
        let mut omega = 1.0_f64;
        let mut rho_prev = 1.0_f64;
        let mut alpha = 0.0_f64;
        let mut error = r.norm() / b_norm;

        let mut i = 0usize;
        while i < self.max_iter && error >= self.rel_tol {
            let rho = r_tld.dot(&r);
            if rho == 0.0 || omega == 0.0 {
                log::warn!("bicgstab breakdown at iteration {i}: rho={rho:e}, omega={omega:e}");
                break;
            }

            if i > 0 {
                let beta = (rho / rho_prev) * (alpha / omega);
                p = &r + (&p - &v * omega) * beta;
            } else {
                p.copy_from(&r);
            }

            let p_tld = self.precondition(&p)?;
            v = self.apply_a(&p_tld)?;

            let r_tld_v = r_tld.dot(&v);
            if r_tld_v == 0.0 {
                log::warn!("bicgstab breakdown at iteration {i}: r~.v vanished");
                break;
            }
            alpha = rho / r_tld_v;

            let s = &r - &v * alpha;
            let s_norm = s.norm();
            if s_norm < self.rel_tol * b_norm {
                x.axpy(alpha, &p_tld, 1.0);
                error = s_norm / b_norm;
                i += 1;
                break;
            }

            let s_tld = self.precondition(&s)?;
            let t = self.apply_a(&s_tld)?;
            omega = t.dot(&s) / t.dot(&t);

            x.axpy(alpha, &p_tld, 1.0);
            x.axpy(omega, &s_tld, 1.0);
            r = s - t * omega;
            error = r.norm() / b_norm;
            rho_prev = rho;
            i += 1;
        }

        if error >= self.rel_tol || !error.is_finite() {
            let reason = if i >= self.max_iter {
                "max number of iterations exceeded"
            } else {
                "could not converge"
            };
            return Err(FdmError::ConvergenceFailure(format!(
                "bicgstab: {reason} (iterations={i}, relative residual={error:e})"
            )));
        }

        log::debug!("bicgstab converged in {i} iterations, relative residual {error:e}");
        Ok(BiCGStabResult {
            iterations: i,
            error,
            x,
        })
    }
}
