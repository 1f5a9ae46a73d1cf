//! Time-stepping engines.

pub mod pde;
