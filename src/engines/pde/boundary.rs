//! Boundary conditions and the ordered dispatcher schemes bracket their
//! operator applications and linear solves with.

use std::sync::Arc;

use crate::core::{Array, FdmError};

use super::operator::FdmLinearOpComposite;

/// Boundary condition lifecycle hooks.
///
/// Hooks run around every operator application and implicit solve of a
/// scheme. Conditions that depend on time keep that state behind interior
/// mutability and update it in [`set_time`](BoundaryCondition::set_time).
pub trait BoundaryCondition {
    /// Runs before `L` is applied to a vector.
    fn apply_before_applying(&self, _op: &dyn FdmLinearOpComposite) {}

    /// Adjusts the result of an operator application.
    fn apply_after_applying(&self, a: &mut Array);

    /// Adjusts the right-hand side of an implicit solve.
    fn apply_before_solving(&self, _op: &dyn FdmLinearOpComposite, _rhs: &mut Array) {}

    /// Adjusts the solution of an implicit solve.
    fn apply_after_solving(&self, a: &mut Array);

    fn set_time(&self, _t: f64) {}
}

/// Ordered list of boundary conditions. Conditions fire in insertion order.
#[derive(Clone, Default)]
pub struct BoundaryConditionSet {
    conditions: Vec<Arc<dyn BoundaryCondition>>,
}

impl BoundaryConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_conditions(conditions: Vec<Arc<dyn BoundaryCondition>>) -> Self {
        Self { conditions }
    }

    pub fn with(mut self, condition: Arc<dyn BoundaryCondition>) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn push(&mut self, condition: Arc<dyn BoundaryCondition>) {
        self.conditions.push(condition);
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn apply_before_applying(&self, op: &dyn FdmLinearOpComposite) {
        for bc in &self.conditions {
            bc.apply_before_applying(op);
        }
    }

    pub fn apply_after_applying(&self, a: &mut Array) {
        for bc in &self.conditions {
            bc.apply_after_applying(a);
        }
    }

    pub fn apply_before_solving(&self, op: &dyn FdmLinearOpComposite, rhs: &mut Array) {
        for bc in &self.conditions {
            bc.apply_before_solving(op, rhs);
        }
    }

    pub fn apply_after_solving(&self, a: &mut Array) {
        for bc in &self.conditions {
            bc.apply_after_solving(a);
        }
    }

    pub fn set_time(&self, t: f64) {
        for bc in &self.conditions {
            bc.set_time(t);
        }
    }
}

impl std::fmt::Debug for BoundaryConditionSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryConditionSet")
            .field("len", &self.conditions.len())
            .finish()
    }
}

/// Pins a fixed set of state entries to a constant value.
#[derive(Debug, Clone, PartialEq)]
pub struct DirichletBoundary {
    indices: Vec<usize>,
    value: f64,
}

impl DirichletBoundary {
    pub fn new(indices: Vec<usize>, value: f64) -> Result<Self, FdmError> {
        if !value.is_finite() {
            return Err(FdmError::InvalidInput(
                "Dirichlet boundary value must be finite".to_string(),
            ));
        }
        Ok(Self { indices, value })
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    fn pin(&self, a: &mut Array) {
        for &i in &self.indices {
            if let Some(v) = a.get_mut(i) {
                *v = self.value;
            }
        }
    }
}

impl BoundaryCondition for DirichletBoundary {
    fn apply_after_applying(&self, a: &mut Array) {
        self.pin(a);
    }

    fn apply_before_solving(&self, _op: &dyn FdmLinearOpComposite, rhs: &mut Array) {
        self.pin(rhs);
    }

    fn apply_after_solving(&self, a: &mut Array) {
        self.pin(a);
    }
}
