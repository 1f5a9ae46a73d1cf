//! Finite-difference time-stepping schemes.
//!
//! A scheme advances a state vector from `t` to `t - dt` given a composite
//! operator and its boundary conditions. Schemes are configured once per
//! problem, receive the step size through [`FdmScheme::set_step`] and are then
//! stepped repeatedly by an external time-marching loop with non-increasing
//! `t` (see [`crate::engines::pde::backward_solver`]).
//!
//! Implicit stages of one-dimensional operators are solved directly through
//! `solve_splitting`; multi-dimensional operators go through BiCGStab or GMRES
//! per [`SolverSettings`].

use crate::core::{Array, FdmError, SolverSettings, SolverType};
use crate::math::{BiCGStab, Gmres};

use super::boundary::BoundaryConditionSet;
use super::operator::FdmLinearOpComposite;

pub mod craig_sneyd;
pub mod crank_nicolson;
pub mod douglas;
pub mod explicit_euler;
pub mod hundsdorfer;
pub mod implicit_euler;
pub mod method_of_lines;
pub mod trbdf2;

pub use craig_sneyd::{CraigSneydScheme, ModifiedCraigSneydScheme};
pub use crank_nicolson::CrankNicolsonScheme;
pub use douglas::DouglasScheme;
pub use explicit_euler::ExplicitEulerScheme;
pub use hundsdorfer::HundsdorferScheme;
pub use implicit_euler::ImplicitEulerScheme;
pub use method_of_lines::MethodOfLinesScheme;
pub use trbdf2::TrBdf2Scheme;

/// Tolerance below zero accepted for `t - dt` before a step is rejected.
const NEGATIVE_TIME_TOL: f64 = 1.0e-8;

/// A single-step time integrator.
pub trait FdmScheme {
    /// Sets the step size used by subsequent [`step`](FdmScheme::step) calls.
    fn set_step(&mut self, dt: f64);

    /// Advances `a` from `t` to `t - dt` in place.
    fn step(&mut self, a: &mut Array, t: f64) -> Result<(), FdmError>;
}

/// Scheme whose step can be weighted by `theta` (a fraction of `dt`).
pub trait MixedScheme: FdmScheme {
    fn step_theta(&mut self, a: &mut Array, t: f64, theta: f64) -> Result<(), FdmError>;
}

impl<S: FdmScheme + ?Sized> FdmScheme for Box<S> {
    fn set_step(&mut self, dt: f64) {
        (**self).set_step(dt);
    }

    fn step(&mut self, a: &mut Array, t: f64) -> Result<(), FdmError> {
        (**self).step(a, t)
    }
}

/// Validates the configured step size against the target time and returns it.
pub(crate) fn checked_step(t: f64, dt: Option<f64>) -> Result<f64, FdmError> {
    let dt = dt.ok_or_else(|| {
        FdmError::InvalidInput("time step not set; call set_step first".to_string())
    })?;
    if !dt.is_finite() || dt < 0.0 {
        return Err(FdmError::InvalidInput(format!(
            "time step must be finite and >= 0, got {dt}"
        )));
    }
    if !t.is_finite() || t - dt < -NEGATIVE_TIME_TOL {
        return Err(FdmError::InvalidInput(
            "a step towards negative time given".to_string(),
        ));
    }
    Ok(dt)
}

/// Freezes operator and boundary time on `[max(0, t - dt), t]`.
pub(crate) fn set_step_time(
    op: &dyn FdmLinearOpComposite,
    bc_set: &BoundaryConditionSet,
    t: f64,
    dt: f64,
) {
    let from = (t - dt).max(0.0);
    op.set_time(from, t);
    bc_set.set_time(from);
}

/// Explicit predictor `a + dt·L a`, bracketed by the applying hooks.
pub(crate) fn explicit_predictor(
    op: &dyn FdmLinearOpComposite,
    bc_set: &BoundaryConditionSet,
    a: &Array,
    dt: f64,
) -> Result<Array, FdmError> {
    bc_set.apply_before_applying(op);
    let mut y = a + op.apply(a)? * dt;
    bc_set.apply_after_applying(&mut y);
    Ok(y)
}

/// One implicit correction per direction, in direction order:
/// `y <- (I - θdt·L_i)⁻¹ (y - θdt·L_i base)`.
pub(crate) fn directional_corrections(
    op: &dyn FdmLinearOpComposite,
    mut y: Array,
    base: &Array,
    theta_dt: f64,
) -> Result<Array, FdmError> {
    for i in 0..op.size() {
        let rhs = y - op.apply_direction(i, base)? * theta_dt;
        y = op.solve_splitting(i, &rhs, -theta_dt)?;
    }
    Ok(y)
}

/// Solves `x - s·L x = rhs`, returning the solution and the solver's
/// iteration count (zero for direct solves).
pub(crate) fn solve_implicit(
    op: &dyn FdmLinearOpComposite,
    rhs: &Array,
    s: f64,
    settings: &SolverSettings,
) -> Result<(Array, usize), FdmError> {
    if op.size() == 1 {
        return Ok((op.solve_splitting(0, rhs, -s)?, 0));
    }

    settings.validate()?;
    let apply = |r: &Array| -> Result<Array, FdmError> { Ok(r - op.apply(r)? * s) };
    let preconditioner = |r: &Array| op.preconditioner(r, -s);
    let n = rhs.len();

    match settings.solver_type {
        SolverType::BiCGStab => {
            let result = BiCGStab::new(&apply, n.max(10), settings.rel_tol)
                .with_preconditioner(&preconditioner)
                .solve(rhs, Some(rhs))?;
            Ok((result.x, result.iterations))
        }
        SolverType::Gmres => {
            let result = Gmres::new(&apply, (n / 10).max(10), settings.rel_tol)
                .with_preconditioner(&preconditioner)
                .solve(rhs, Some(rhs))?;
            Ok((result.x, result.errors.len()))
        }
    }
}
