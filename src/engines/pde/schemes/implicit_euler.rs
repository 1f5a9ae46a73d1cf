use crate::core::{Array, FdmError, SolverSettings, SolverType};
use crate::engines::pde::boundary::BoundaryConditionSet;
use crate::engines::pde::operator::SharedOperator;

use super::{FdmScheme, MixedScheme, checked_step, set_step_time, solve_implicit};

/// Backward Euler: solves `(I - dt·L) x = a` per step.
///
/// One-dimensional operators are inverted with `solve_splitting`; otherwise the
/// system is handed to the Krylov solver selected in [`SolverSettings`],
/// preconditioned with the operator's own approximate inverse.
pub struct ImplicitEulerScheme {
    op: SharedOperator,
    bc_set: BoundaryConditionSet,
    settings: SolverSettings,
    dt: Option<f64>,
    iterations: usize,
}

impl ImplicitEulerScheme {
    pub fn new(op: SharedOperator, bc_set: BoundaryConditionSet) -> Self {
        Self {
            op,
            bc_set,
            settings: SolverSettings::default(),
            dt: None,
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

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Krylov iterations accumulated over all steps so far.
    pub fn number_of_iterations(&self) -> usize {
        self.iterations
    }
}

impl FdmScheme for ImplicitEulerScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: f64) -> Result<(), FdmError> {
        self.step_theta(a, t, 1.0)
    }
}

impl MixedScheme for ImplicitEulerScheme {
    fn step_theta(&mut self, a: &mut Array, t: f64, theta: f64) -> Result<(), FdmError> {
        let dt = checked_step(t, self.dt)?;
        let op = self.op.as_ref();
        set_step_time(op, &self.bc_set, t, dt);

        let mut rhs = a.clone();
        self.bc_set.apply_before_solving(op, &mut rhs);
        let (x, iterations) = solve_implicit(op, &rhs, theta * dt, &self.settings)?;
        self.iterations += iterations;
        *a = x;
        self.bc_set.apply_after_solving(a);

        log::trace!("implicit euler step t={t} dt={dt} theta={theta} iterations={iterations}");
        Ok(())
    }
}
