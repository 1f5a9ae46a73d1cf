//! ferric-fdm is the time-stepping core of a finite-difference PDE solver: given a
//! discretized spatial operator `L` (split by dimension, with an optional mixed
//! term), it advances a state vector backwards in time with a family of
//! operator-splitting and implicit schemes.
//!
//! The crate combines matrix-free Krylov solvers (BiCGStab, restarted GMRES),
//! an adaptive Cash-Karp integrator, ADI schemes (Douglas, Craig-Sneyd,
//! Modified Craig-Sneyd, Hundsdorfer-Verwer), Euler and θ-schemes, method of
//! lines and TR-BDF2, plus boundary condition dispatch and rollback drivers.
//!
//! References used across modules include:
//! - Saad and Schultz (1986) for GMRES, van der Vorst (1992) for BiCGStab.
//! - in 't Hout and Foulon (2010) for ADI schemes with mixed derivatives.
//! - Bank et al. (1985) and Hosea and Shampine (1996) for TR-BDF2.
//! - Cash and Karp (1990) for the embedded Runge-Kutta pair.
//!
//! Numerical considerations:
//! - An operator describes `dV/dτ = L V`; a step from `t` to `t - dt` solves
//!   `(I - θ·dt·L) x = a` for its implicit part.
//! - One-dimensional implicit stages are solved directly; multi-dimensional
//!   ones go through a preconditioned Krylov method chosen by
//!   [`SolverSettings`](crate::core::SolverSettings).
//! - Explicit Euler is only conditionally stable; TR-BDF2 and implicit Euler are
//!   L-stable and damp stiff modes.
//!
//! # Feature Flags
//! - `parallel`: rolls back independent state vectors on the Rayon pool.
//!
//! # Quick Start
//! One implicit Euler step of the decay operator `L = -I`:
//! ```rust
//! use std::sync::Arc;
//! use ferric_fdm::core::Array;
//! use ferric_fdm::engines::pde::{BoundaryConditionSet, FdmScheme, ImplicitEulerScheme, TripleBandOp};
//!
//! let op = Arc::new(TripleBandOp::uniform(2, 0.0, -1.0, 0.0).unwrap());
//! let mut scheme = ImplicitEulerScheme::new(op, BoundaryConditionSet::new());
//! scheme.set_step(0.5);
//!
//! let mut a = Array::from_vec(vec![1.0, 1.0]);
//! scheme.step(&mut a, 1.0).unwrap();
//! assert!((a[0] - 1.0 / 1.5).abs() < 1.0e-12);
//! ```
//!
//! Solve a linear system matrix-free:
//! ```rust
//! use ferric_fdm::core::Array;
//! use ferric_fdm::math::{BiCGStab, MatrixOperator};
//!
//! let a = MatrixOperator::diagonal(&[2.0, 3.0, 4.0, 5.0]);
//! let b = Array::from_vec(vec![2.0, 3.0, 4.0, 5.0]);
//! let res = BiCGStab::new(&a, 10, 1.0e-8).solve(&b, None).unwrap();
//! assert!((res.x[3] - 1.0).abs() < 1.0e-8);
//! ```
//!
//! Roll back with TR-BDF2 after two damping steps:
//! ```rust
//! use std::sync::Arc;
//! use ferric_fdm::core::Array;
//! use ferric_fdm::engines::pde::{BackwardSolver, BoundaryConditionSet, SchemeDesc, TripleBandOp};
//!
//! let op = Arc::new(TripleBandOp::uniform(1, 0.0, -1.0, 0.0).unwrap());
//! let solver = BackwardSolver::new(op, BoundaryConditionSet::new(), SchemeDesc::trbdf2());
//! let mut v = Array::from_element(1, 1.0);
//! solver.rollback(&mut v, 1.0, 0.0, 20, 2).unwrap();
//! assert!((v[0] - (-1.0_f64).exp()).abs() < 5.0e-3);
//! ```

pub mod core;
pub mod engines;
pub mod math;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::*;
    pub use crate::engines::pde::*;
    pub use crate::math::*;
}
