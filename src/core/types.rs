use serde::{Deserialize, Serialize};

use super::FdmError;

/// Krylov method used when an implicit system cannot be solved by splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverType {
    /// Preconditioned bi-conjugate gradient stabilized.
    #[default]
    BiCGStab,
    /// Preconditioned generalized minimal residual.
    Gmres,
}

impl SolverType {
    #[inline]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BiCGStab => "bicgstab",
            Self::Gmres => "gmres",
        }
    }
}

impl std::fmt::Display for SolverType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SolverType {
    type Err = FdmError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key.to_ascii_lowercase().as_str() {
            "bicgstab" => Ok(Self::BiCGStab),
            "gmres" => Ok(Self::Gmres),
            _ => Err(FdmError::InvalidInput(format!(
                "unknown/illegal solver type `{key}`"
            ))),
        }
    }
}

/// Linear-solver configuration used by implicit schemes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Krylov method for multi-dimensional operators.
    pub solver_type: SolverType,
    /// Relative residual target `‖b - A x‖ / ‖b‖`.
    pub rel_tol: f64,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            solver_type: SolverType::BiCGStab,
            rel_tol: 1.0e-8,
        }
    }
}

impl SolverSettings {
    pub fn new(solver_type: SolverType, rel_tol: f64) -> Self {
        Self {
            solver_type,
            rel_tol,
        }
    }

    pub fn with_solver_type(mut self, solver_type: SolverType) -> Self {
        self.solver_type = solver_type;
        self
    }

    pub fn with_rel_tol(mut self, rel_tol: f64) -> Self {
        self.rel_tol = rel_tol;
        self
    }

    pub fn validate(&self) -> Result<(), FdmError> {
        if !self.rel_tol.is_finite() || self.rel_tol <= 0.0 {
            return Err(FdmError::InvalidInput(
                "rel_tol must be finite and > 0".to_string(),
            ));
        }
        Ok(())
    }
}
