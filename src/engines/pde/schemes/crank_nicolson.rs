use crate::core::{Array, FdmError, SolverSettings};
use crate::engines::pde::boundary::BoundaryConditionSet;
use crate::engines::pde::operator::SharedOperator;

use super::{ExplicitEulerScheme, FdmScheme, ImplicitEulerScheme, MixedScheme, checked_step};

/// θ-scheme: an explicit stage weighted `1 - θ` followed by an implicit stage
/// weighted `θ`. `θ = 1/2` is Crank-Nicolson, `θ = 1` backward Euler.
pub struct CrankNicolsonScheme {
    theta: f64,
    explicit: ExplicitEulerScheme,
    implicit: ImplicitEulerScheme,
    dt: Option<f64>,
}

impl CrankNicolsonScheme {
    pub fn new(theta: f64, op: SharedOperator, bc_set: BoundaryConditionSet) -> Self {
        Self {
            theta,
            explicit: ExplicitEulerScheme::new(op.clone(), bc_set.clone()),
            implicit: ImplicitEulerScheme::new(op, bc_set),
            dt: None,
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.implicit = self.implicit.with_settings(settings);
        self
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    pub fn number_of_iterations(&self) -> usize {
        self.implicit.number_of_iterations()
    }
}

impl FdmScheme for CrankNicolsonScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = Some(dt);
        self.explicit.set_step(dt);
        self.implicit.set_step(dt);
    }

    fn step(&mut self, a: &mut Array, t: f64) -> Result<(), FdmError> {
        checked_step(t, self.dt)?;
        if !(0.0..=1.0).contains(&self.theta) {
            return Err(FdmError::InvalidInput(format!(
                "theta must be in [0, 1], got {}",
                self.theta
            )));
        }

        // Stages run on a copy so a failed implicit solve leaves `a` untouched.
        let mut x = a.clone();
        if self.theta != 1.0 {
            self.explicit.step_theta(&mut x, t, 1.0 - self.theta)?;
        }
        if self.theta != 0.0 {
            self.implicit.step_theta(&mut x, t, self.theta)?;
        }
        *a = x;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::engines::pde::operator::TripleBandOp;

    #[test]
    fn half_theta_is_trapezoidal_rule() {
        let k = 2.0;
        let dt = 0.1;
        let op = Arc::new(TripleBandOp::uniform(1, 0.0, -k, 0.0).unwrap());
        let mut scheme = CrankNicolsonScheme::new(0.5, op, BoundaryConditionSet::new());
        scheme.set_step(dt);

        let mut a = Array::from_element(1, 1.0);
        scheme.step(&mut a, 1.0).unwrap();
        let expected = (1.0 - 0.5 * k * dt) / (1.0 + 0.5 * k * dt);
        assert_abs_diff_eq!(a[0], expected, epsilon = 1.0e-14);
    }

    #[test]
    fn theta_extremes_reduce_to_single_stage() {
        let op: SharedOperator = Arc::new(TripleBandOp::uniform(1, 0.0, -1.0, 0.0).unwrap());

        let mut implicit = CrankNicolsonScheme::new(1.0, op.clone(), BoundaryConditionSet::new());
        implicit.set_step(0.5);
        let mut a = Array::from_element(1, 1.0);
        implicit.step(&mut a, 1.0).unwrap();
        assert_abs_diff_eq!(a[0], 1.0 / 1.5, epsilon = 1.0e-14);

        let mut explicit = CrankNicolsonScheme::new(0.0, op, BoundaryConditionSet::new());
        explicit.set_step(0.5);
        let mut a = Array::from_element(1, 1.0);
        explicit.step(&mut a, 1.0).unwrap();
        assert_abs_diff_eq!(a[0], 0.5, epsilon = 1.0e-14);
    }

    #[test]
    fn out_of_range_theta_is_rejected() {
        let op = Arc::new(TripleBandOp::uniform(1, 0.0, -1.0, 0.0).unwrap());
        let mut scheme = CrankNicolsonScheme::new(1.5, op, BoundaryConditionSet::new());
        scheme.set_step(0.1);
        let mut a = Array::from_element(1, 1.0);
        assert!(scheme.step(&mut a, 1.0).is_err());
    }
}
