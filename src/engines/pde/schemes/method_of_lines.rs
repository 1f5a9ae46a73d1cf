use crate::core::{Array, FdmError};
use crate::engines::pde::boundary::BoundaryConditionSet;
use crate::engines::pde::operator::SharedOperator;
use crate::math::AdaptiveRungeKutta;

use super::{FdmScheme, checked_step};

/// Method of lines: treats the semi-discrete system `dy/dτ = L y` as an ODE
/// and integrates each step with an adaptive Cash-Karp Runge-Kutta method.
///
/// The operator's time is refreshed at every derivative evaluation, so
/// time-dependent coefficients are sampled inside the step rather than
/// frozen over it.
pub struct MethodOfLinesScheme {
    eps: f64,
    rel_init_step_size: f64,
    op: SharedOperator,
    bc_set: BoundaryConditionSet,
    dt: Option<f64>,
}

impl MethodOfLinesScheme {
    pub const DEFAULT_EPS: f64 = 1.0e-3;
    pub const DEFAULT_REL_INIT_STEP_SIZE: f64 = 1.0e-2;

    /// `rel_init_step_size` is the integrator's first step as a fraction of `dt`.
    pub fn new(
        eps: f64,
        rel_init_step_size: f64,
        op: SharedOperator,
        bc_set: BoundaryConditionSet,
    ) -> Self {
        Self {
            eps,
            rel_init_step_size,
            op,
            bc_set,
            dt: None,
        }
    }

    pub fn with_defaults(op: SharedOperator, bc_set: BoundaryConditionSet) -> Self {
        Self::new(
            Self::DEFAULT_EPS,
            Self::DEFAULT_REL_INIT_STEP_SIZE,
            op,
            bc_set,
        )
    }

    /// Time derivative of the state when marching backwards, `-L y`.
    fn derivative(&self, t: f64, y: &Array) -> Result<Array, FdmError> {
        self.op.set_time(t, t + 0.0001);
        self.bc_set.set_time(t);
        self.bc_set.apply_before_applying(self.op.as_ref());
        Ok(-self.op.apply(y)?)
    }
}

impl FdmScheme for MethodOfLinesScheme {
    fn set_step(&mut self, dt: f64) {
        self.dt = Some(dt);
    }

    fn step(&mut self, a: &mut Array, t: f64) -> Result<(), FdmError> {
        let dt = checked_step(t, self.dt)?;
        let to = (t - dt).max(0.0);

        let mut y = if to < t {
            let rk = AdaptiveRungeKutta::new(self.eps, self.rel_init_step_size * dt);
            rk.integrate(|tau, y| self.derivative(tau, y), a, t, to)?
        } else {
            a.clone()
        };
        self.bc_set.apply_after_solving(&mut y);

        log::trace!("method of lines step t={t} -> {to}");
        *a = y;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::engines::pde::operator::TripleBandOp;
    use crate::engines::pde::schemes::test_support::DiagonalOp;

    #[test]
    fn scalar_decay_tracks_exponential() {
        let op = Arc::new(TripleBandOp::uniform(1, 0.0, -1.0, 0.0).unwrap());
        let mut scheme = MethodOfLinesScheme::with_defaults(op, BoundaryConditionSet::new());
        scheme.set_step(0.5);

        let mut a = Array::from_element(1, 1.0);
        scheme.step(&mut a, 1.0).unwrap();
        assert_abs_diff_eq!(a[0], (-0.5_f64).exp(), epsilon = 1.0e-5);
    }

    #[test]
    fn tight_tolerance_is_more_accurate() {
        let op = Arc::new(DiagonalOp::new(vec![-1.0, -2.0], 2));
        let mut scheme =
            MethodOfLinesScheme::new(1.0e-8, 1.0e-2, op.clone(), BoundaryConditionSet::new());
        scheme.set_step(0.5);

        let mut a = Array::from_element(2, 1.0);
        scheme.step(&mut a, 0.5).unwrap();
        assert_abs_diff_eq!(a[0], (-0.5_f64).exp(), epsilon = 1.0e-7);
        assert_abs_diff_eq!(a[1], (-1.0_f64).exp(), epsilon = 1.0e-7);

        // Last evaluation samples the operator inside [0, 0.5].
        let (t1, t2) = op.last_time.get();
        assert!((0.0..=0.5).contains(&t1));
        assert_abs_diff_eq!(t2 - t1, 0.0001, epsilon = 1.0e-12);
    }

    #[test]
    fn zero_step_is_a_no_op() {
        let op = Arc::new(TripleBandOp::uniform(1, 0.0, -1.0, 0.0).unwrap());
        let mut scheme = MethodOfLinesScheme::with_defaults(op, BoundaryConditionSet::new());
        scheme.set_step(0.0);
        let mut a = Array::from_element(1, 2.0);
        scheme.step(&mut a, 1.0).unwrap();
        assert_eq!(a[0], 2.0);
    }
}
