//! Backward time marching on top of the scheme family.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::core::{Array, FdmError, SolverSettings};

use super::boundary::BoundaryConditionSet;
use super::operator::SharedOperator;
use super::scheme_desc::{SchemeDesc, SchemeFactory, SchemeKind};
use super::schemes::{FdmScheme, ImplicitEulerScheme};

/// Steps `scheme` from `from` down to `to` in `steps` equal steps.
pub fn rollback<S: FdmScheme + ?Sized>(
    scheme: &mut S,
    a: &mut Array,
    from: f64,
    to: f64,
    steps: usize,
) -> Result<(), FdmError> {
    if steps == 0 {
        return Err(FdmError::InvalidInput(
            "number of time steps must be > 0".to_string(),
        ));
    }
    if !from.is_finite() || !to.is_finite() || from < to {
        return Err(FdmError::InvalidInput(format!(
            "trying to roll back from {from} to {to}"
        )));
    }

    let dt = (from - to) / steps as f64;
    scheme.set_step(dt);

    let mut t = from;
    for _ in 0..steps {
        let mut next = t - dt;
        if (to - next).abs() < f64::EPSILON.sqrt() {
            next = to;
        }
        scheme.step(a, t)?;
        t = next;
    }
    Ok(())
}

/// Rolls a state back with a configured scheme, optionally preceded by
/// implicit Euler damping steps that smooth non-smooth terminal data.
#[derive(Clone)]
pub struct BackwardSolver {
    op: SharedOperator,
    bc_set: BoundaryConditionSet,
    desc: SchemeDesc,
    settings: SolverSettings,
}

impl std::fmt::Debug for BackwardSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackwardSolver")
            .field("directions", &self.op.size())
            .field("bc_set", &self.bc_set)
            .field("desc", &self.desc)
            .field("settings", &self.settings)
            .finish()
    }
}

impl BackwardSolver {
    pub fn new(op: SharedOperator, bc_set: BoundaryConditionSet, desc: SchemeDesc) -> Self {
        Self {
            op,
            bc_set,
            desc,
            settings: SolverSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn desc(&self) -> &SchemeDesc {
        &self.desc
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    /// Rolls `a` back from `from` to `to`.
    ///
    /// The first `damping_steps` steps (of `steps + damping_steps` equal
    /// slices of the interval) use implicit Euler; the rest use the configured
    /// scheme. An implicit Euler configuration simply takes all steps.
    pub fn rollback(
        &self,
        a: &mut Array,
        from: f64,
        to: f64,
        steps: usize,
        damping_steps: usize,
    ) -> Result<(), FdmError> {
        let all_steps = steps + damping_steps;
        let damping_to = if all_steps == 0 {
            from
        } else {
            from - (from - to) * damping_steps as f64 / all_steps as f64
        };
        log::debug!(
            "rollback {from} -> {to}: {steps} {} steps, {damping_steps} damping steps",
            self.desc.kind
        );

        if self.desc.kind == SchemeKind::ImplicitEuler {
            let mut scheme = self.build()?;
            return rollback(&mut scheme, a, from, to, all_steps);
        }

        if damping_steps > 0 {
            let mut damping = ImplicitEulerScheme::new(self.op.clone(), self.bc_set.clone())
                .with_settings(self.settings);
            rollback(&mut damping, a, from, damping_to, damping_steps)?;
        }

        if steps == 0 && damping_steps > 0 {
            return Ok(());
        }
        let mut scheme = self.build()?;
        rollback(&mut scheme, a, damping_to, to, steps)
    }

    fn build(&self) -> Result<Box<dyn FdmScheme>, FdmError> {
        self.desc
            .build(self.op.clone(), self.bc_set.clone(), self.settings)
    }
}

/// Rolls back independent state vectors, each with its own solver from
/// `make_solver(index)`. Runs on the rayon pool with the `parallel` feature.
pub fn rollback_batch<F>(
    states: &mut [Array],
    make_solver: F,
    from: f64,
    to: f64,
    steps: usize,
    damping_steps: usize,
) -> Result<(), FdmError>
where
    F: Fn(usize) -> Result<BackwardSolver, FdmError> + Sync,
{
    let run = |(i, a): (usize, &mut Array)| -> Result<(), FdmError> {
        make_solver(i)?.rollback(a, from, to, steps, damping_steps)
    };

    #[cfg(feature = "parallel")]
    let iter = states.par_iter_mut();
    #[cfg(not(feature = "parallel"))]
    let iter = states.iter_mut();
    iter.enumerate().try_for_each(run)
}
