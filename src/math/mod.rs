//! Numerical kernels: matrix-free operators, Krylov solvers and ODE integration.

pub mod bicgstab;
pub mod gmres;
pub mod linear_operator;
pub mod ode;

pub use bicgstab::{BiCGStab, BiCGStabResult};
pub use gmres::{Gmres, GmresResult};
pub use linear_operator::{IdentityOperator, LinearOperator, MatrixOperator};
pub use ode::AdaptiveRungeKutta;
