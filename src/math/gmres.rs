//! Preconditioned generalized minimal residual method (Saad and Schultz, 1986).
//!
//! Arnoldi iteration with modified Gram-Schmidt builds an orthonormal Krylov
//! basis; Givens rotations keep the Hessenberg matrix triangular so the
//! least-squares residual is available after every step without refactoring.
//!
//! Memory and per-iteration cost grow with the number of Arnoldi steps, so
//! long solves should go through [`Gmres::solve_with_restart`].

use crate::core::{Array, FdmError, check_len};

use super::linear_operator::LinearOperator;

/// Outcome of a GMRES solve.
#[derive(Debug, Clone, PartialEq)]
pub struct GmresResult {
    /// Relative residual history: the initial residual followed by one entry per
    /// Arnoldi step, concatenated across restart cycles.
    pub errors: Vec<f64>,
    /// Solution vector.
    pub x: Array,
}

impl GmresResult {
    /// Last recorded relative residual.
    pub fn final_error(&self) -> f64 {
        self.errors.last().copied().unwrap_or(f64::INFINITY)
    }
}

/// GMRES solver bound to an operator and optional preconditioner.
pub struct Gmres<'a> {
    a: &'a dyn LinearOperator,
    max_iter: usize,
    rel_tol: f64,
    preconditioner: Option<&'a dyn LinearOperator>,
}

impl<'a> Gmres<'a> {
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

    /// Solves `A x = b` with at most `max_iter` Arnoldi steps.
    pub fn solve(&self, b: &Array, x0: Option<&Array>) -> Result<GmresResult, FdmError> {
        let result = self.solve_impl(b, x0)?;
        self.check_converged(&result)?;
        Ok(result)
    }

    /// Runs up to `restart` GMRES cycles, each restarted from the previous
    /// solution, and concatenates their residual histories.
    pub fn solve_with_restart(
        &self,
        restart: usize,
        b: &Array,
        x0: Option<&Array>,
    ) -> Result<GmresResult, FdmError> {
        if restart == 0 {
            return Err(FdmError::InvalidInput(
                "restart must be >= 1".to_string(),
            ));
        }

        let mut result = self.solve_impl(b, x0)?;
        let mut errors = std::mem::take(&mut result.errors);
        let mut last = errors.last().copied().unwrap_or(f64::INFINITY);

        for cycle in 1..restart {
            if last < self.rel_tol {
                break;
            }
            log::debug!("gmres restart cycle {cycle}, relative residual {last:e}");
            let next = self.solve_impl(b, Some(&result.x))?;
            last = next.final_error();
            errors.extend_from_slice(&next.errors);
            result = next;
        }

        result.errors = errors;
        self.check_converged(&result)?;
        Ok(result)
    }

    fn check_converged(&self, result: &GmresResult) -> Result<(), FdmError> {
        let err = result.final_error();
        if err < self.rel_tol {
            return Ok(());
        }
        Err(FdmError::ConvergenceFailure(format!(
            "gmres: could not converge (steps={}, relative residual={err:e})",
            result.errors.len().saturating_sub(1)
        )))
    }

    fn precondition(&self, x: &Array) -> Result<Array, FdmError> {
        match self.preconditioner {
            Some(m) => m.apply(x),
            None => Ok(x.clone()),
        }
    }

    fn apply_a(&self, x: &Array) -> Result<Array, FdmError> {
        let y = self.a.apply(x)?;
        check_len("gmres operator output", x.len(), y.len())?;
        Ok(y)
    }

    fn solve_impl(&self, b: &Array, x0: Option<&Array>) -> Result<GmresResult, FdmError> {
        if !self.rel_tol.is_finite() || self.rel_tol <= 0.0 {
            return Err(FdmError::InvalidInput(
                "rel_tol must be finite and > 0".to_string(),
            ));
        }

        let bn = b.norm();
        if bn == 0.0 {
            return Ok(GmresResult {
                errors: vec![0.0],
                x: b.clone(),
            });
        }

        let x = match x0 {
            Some(x0) => {
                check_len("gmres initial guess", b.len(), x0.len())?;
                x0.clone()
            }
            None => Array::zeros(b.len()),
        };

        let r = b - self.apply_a(&x)?;
        let g = r.norm();
        if g / bn < self.rel_tol {
            return Ok(GmresResult {
                errors: vec![g / bn],
                x,
            });
        }

        // The Krylov space of an n-dimensional system is at most n-dimensional.
        let m = self.max_iter.min(b.len());
        let mut v: Vec<Array> = Vec::with_capacity(m + 1);
        v.push(r / g);
        // Columns of the Hessenberg matrix; column j holds rows 0..=j+1.
        let mut h: Vec<Vec<f64>> = Vec::with_capacity(m);
        let mut c: Vec<f64> = Vec::with_capacity(m);
        let mut s: Vec<f64> = Vec::with_capacity(m);
        let mut z: Vec<f64> = Vec::with_capacity(m + 1);
        z.push(g);

        let mut errors = Vec::with_capacity(m + 1);
        errors.push(g / bn);

        let breakdown_tol = f64::EPSILON * f64::EPSILON;
        let mut k = 0usize;
        while k < m && errors[errors.len() - 1] >= self.rel_tol {
            let j = k;
            let mut w = self.apply_a(&self.precondition(&v[j])?)?;

            let mut col = vec![0.0_f64; j + 2];
            for (i, vi) in v.iter().enumerate().take(j + 1) {
                let hij = w.dot(vi);
                col[i] = hij;
                w.axpy(-hij, vi, 1.0);
            }
            let w_norm = w.norm();
            col[j + 1] = w_norm;
            let breakdown = w_norm < breakdown_tol;

            for i in 0..j {
                let h0 = c[i] * col[i] + s[i] * col[i + 1];
                let h1 = -s[i] * col[i] + c[i] * col[i + 1];
                col[i] = h0;
                col[i + 1] = h1;
            }

            let nu = col[j].hypot(col[j + 1]);
            if nu == 0.0 {
                log::warn!("gmres breakdown at step {j}: singular Hessenberg column");
                break;
            }
            c.push(col[j] / nu);
            s.push(col[j + 1] / nu);
            col[j] = nu;
            col[j + 1] = 0.0;
            h.push(col);

            z.push(-s[j] * z[j]);
            z[j] *= c[j];
            errors.push((z[j + 1] / bn).abs());
            k += 1;

            if breakdown {
                log::debug!("gmres Krylov space exhausted after {k} steps");
                break;
            }
            v.push(w / w_norm);
        }

        if k == 0 {
            return Err(FdmError::ConvergenceFailure(
                "gmres: no Arnoldi step succeeded".to_string(),
            ));
        }

        let mut y = vec![0.0_f64; k];
        for i in (0..k).rev() {
            let tail: f64 = ((i + 1)..k).map(|l| h[l][i] * y[l]).sum();
            y[i] = (z[i] - tail) / h[i][i];
        }

        let mut correction = Array::zeros(b.len());
        for (yi, vi) in y.iter().zip(&v) {
            correction.axpy(*yi, vi, 1.0);
        }
        let x = x + self.precondition(&correction)?;

        Ok(GmresResult { errors, x })
    }
}
