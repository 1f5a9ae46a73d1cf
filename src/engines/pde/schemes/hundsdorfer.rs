use crate::core::{Array, FdmError};
use crate::engines::pde::boundary::BoundaryConditionSet;
use crate::engines::pde::operator::SharedOperator;

use super::{
    FdmScheme, checked_step, directional_corrections, explicit_predictor, set_step_time,
};

/// Hundsdorfer-Verwer ADI scheme.
///
/// The second predictor adds `μ·dt` times the full operator change and its
/// corrections are taken around the first-sweep result instead of `a`.
pub struct HundsdorferScheme {
    theta: f64,
    mu: f64,
    op: SharedOperator,
    bc_set: BoundaryConditionSet,
    dt: Option<f64>,
}

impl HundsdorferScheme {
    pub const DEFAULT_THETA: f64 = 0.5 + 0.288_675_134_594_812_9;
    pub const DEFAULT_MU: f64 = 0.5;

    pub fn new(theta: f64, mu: f64, op: SharedOperator, bc_set: BoundaryConditionSet) -> Self {
        Self {
            theta,
            mu,
            op,
            bc_set,
            dt: None,
        }
    }

    /// Scheme with `θ = 1/2 + √3/6` and `μ = 1/2`.
    pub fn with_defaults(op: SharedOperator, bc_set: BoundaryConditionSet) -> Self {
        Self::new(Self::DEFAULT_THETA, Self::DEFAULT_MU, op, bc_set)
    }
}

impl FdmScheme for HundsdorferScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: f64) -> Result<(), FdmError> {
        let dt = checked_step(t, self.dt)?;
        let op = self.op.as_ref();
        set_step_time(op, &self.bc_set, t, dt);

        let y0 = explicit_predictor(op, &self.bc_set, a, dt)?;
        let y = directional_corrections(op, y0.clone(), a, self.theta * dt)?;

        self.bc_set.apply_before_applying(op);
        let mut yt = y0 + op.apply(&(&y - &*a))? * (self.mu * dt);
        self.bc_set.apply_after_applying(&mut yt);

        let mut y = directional_corrections(op, yt, &y, self.theta * dt)?;
        self.bc_set.apply_after_solving(&mut y);
        *a = y;
        Ok(())
    }
}
