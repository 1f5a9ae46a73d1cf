use crate::core::{Array, FdmError};
use crate::engines::pde::boundary::BoundaryConditionSet;
use crate::engines::pde::operator::SharedOperator;

use super::{FdmScheme, MixedScheme, checked_step, explicit_predictor, set_step_time};

/// Forward Euler: `a <- a + dt·L a`. Conditionally stable only.
pub struct ExplicitEulerScheme {
    op: SharedOperator,
    bc_set: BoundaryConditionSet,
    dt: Option<f64>,
}

impl ExplicitEulerScheme {
    pub fn new(op: SharedOperator, bc_set: BoundaryConditionSet) -> Self {
        Self {
            op,
            bc_set,
            dt: None,
        }
    }
}

impl FdmScheme for ExplicitEulerScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: f64) -> Result<(), FdmError> {
        self.step_theta(a, t, 1.0)
    }
}

impl MixedScheme for ExplicitEulerScheme {
    fn step_theta(&mut self, a: &mut Array, t: f64, theta: f64) -> Result<(), FdmError> {
        let dt = checked_step(t, self.dt)?;
        let op = self.op.as_ref();
        set_step_time(op, &self.bc_set, t, dt);
        *a = explicit_predictor(op, &self.bc_set, a, theta * dt)?;
        Ok(())
    }
}
