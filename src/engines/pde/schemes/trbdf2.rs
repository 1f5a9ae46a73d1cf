use crate::core::{Array, FdmError, SolverSettings, SolverType};
use crate::engines::pde::boundary::BoundaryConditionSet;
use crate::engines::pde::operator::SharedOperator;

use super::{CrankNicolsonScheme, FdmScheme, checked_step, solve_implicit};

/// TR-BDF2: a trapezoidal stage over `α·dt` followed by a BDF2 stage over the
/// remainder of the step. L-stable and second order.
///
/// The trapezoidal stage is delegated to any [`FdmScheme`]; the usual choice
/// is a Crank-Nicolson scheme sharing the same operator and boundaries
/// (see [`TrBdf2Scheme::crank_nicolson`]). Only `set_step` and `step` of the
/// inner scheme are used, so it need not be a [`MixedScheme`](super::MixedScheme).
pub struct TrBdf2Scheme<S: FdmScheme> {
    alpha: f64,
    op: SharedOperator,
    trapezoidal: S,
    bc_set: BoundaryConditionSet,
    settings: SolverSettings,
    dt: Option<f64>,
    beta: f64,
    iterations: usize,
}

impl<S: FdmScheme> TrBdf2Scheme<S> {
    /// `α = 2 - √2`, the value for which both stages share one Jacobian shift.
    pub const DEFAULT_ALPHA: f64 = 2.0 - std::f64::consts::SQRT_2;

    pub fn new(alpha: f64, op: SharedOperator, trapezoidal: S, bc_set: BoundaryConditionSet) -> Self {
        Self {
            alpha,
            op,
            trapezoidal,
            bc_set,
            settings: SolverSettings::default(),
            dt: None,
            beta: 0.0,
            iterations: 0,
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_solver_type(mut self, solver_type: SolverType) -> Self {
        self.settings.solver_type = solver_type;
        self
    }

    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.settings.rel_tol = rel_tol;
        self
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Krylov iterations of the BDF2 stage accumulated over all steps.
    pub fn number_of_iterations(&self) -> usize {
        self.iterations
    }
}

impl TrBdf2Scheme<CrankNicolsonScheme> {
    /// TR-BDF2 with the default `α` and a Crank-Nicolson trapezoidal stage.
    pub fn crank_nicolson(op: SharedOperator, bc_set: BoundaryConditionSet) -> Self {
        let trapezoidal = CrankNicolsonScheme::new(0.5, op.clone(), bc_set.clone());
        Self::new(Self::DEFAULT_ALPHA, op, trapezoidal, bc_set)
    }
}

impl<S: FdmScheme> FdmScheme for TrBdf2Scheme<S> {
    fn set_step(&mut self, dt: f64) {
        self.dt = Some(dt);
        self.beta = (1.0 - self.alpha) / (2.0 - self.alpha) * dt;
    }

    fn step(&mut self, a: &mut Array, t: f64) -> Result<(), FdmError> {
        let dt = checked_step(t, self.dt)?;
        let alpha = self.alpha;
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(FdmError::InvalidInput(format!(
                "alpha must be in (0, 1], got {alpha}"
            )));
        }

        let mut f_star = a.clone();
        self.trapezoidal.set_step(alpha * dt);
        self.trapezoidal.step(&mut f_star, t)?;

        let from = (t - dt).max(0.0);
        let op = self.op.as_ref();
        op.set_time(from, t);
        self.bc_set.set_time(from);
        self.bc_set.apply_before_solving(op, &mut f_star);

        let f = (f_star / alpha - &*a * ((1.0 - alpha) * (1.0 - alpha) / alpha)) / (2.0 - alpha);
        let (x, iterations) = solve_implicit(op, &f, self.beta, &self.settings)?;
        self.iterations += iterations;
        *a = x;
        self.bc_set.apply_after_solving(a);

        log::trace!("tr-bdf2 step t={t} dt={dt} iterations={iterations}");
        Ok(())
    }
}
