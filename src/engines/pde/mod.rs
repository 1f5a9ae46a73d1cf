//! Finite-difference time stepping for discretized PDE operators.
//!
//! Layout:
//! - [`operator`]: the composite operator interface schemes consume, plus a
//!   one-dimensional tridiagonal building block.
//! - [`boundary`]: boundary condition hooks and their ordered dispatcher.
//! - [`schemes`]: Euler, θ, ADI (Douglas, Craig-Sneyd, Hundsdorfer),
//!   method-of-lines and TR-BDF2 schemes.
//! - [`scheme_desc`]: scheme selection as serializable data.
//! - [`backward_solver`]: rollback loops with implicit Euler damping.

pub mod backward_solver;
pub mod boundary;
mod fd_common;
pub mod operator;
pub mod scheme_desc;
pub mod schemes;

pub use backward_solver::{BackwardSolver, rollback, rollback_batch};
pub use boundary::{BoundaryCondition, BoundaryConditionSet, DirichletBoundary};
pub use operator::{FdmLinearOpComposite, SharedOperator, TripleBandOp};
pub use scheme_desc::{SchemeDesc, SchemeFactory, SchemeKind};
pub use schemes::{
    CraigSneydScheme, CrankNicolsonScheme, DouglasScheme, ExplicitEulerScheme, FdmScheme,
    HundsdorferScheme, ImplicitEulerScheme, MethodOfLinesScheme, MixedScheme,
    ModifiedCraigSneydScheme, TrBdf2Scheme,
};
