//! Scheme selection as plain data.
//!
//! [`SchemeDesc`] names a scheme together with its two tuning parameters and
//! can be deserialized from configuration; [`SchemeFactory`] turns it into a
//! boxed scheme bound to an operator and its boundary conditions.

use serde::{Deserialize, Serialize};

use crate::core::{FdmError, SolverSettings};

use super::boundary::BoundaryConditionSet;
use super::operator::SharedOperator;
use super::schemes::{
    CraigSneydScheme, CrankNicolsonScheme, DouglasScheme, ExplicitEulerScheme, FdmScheme,
    HundsdorferScheme, ImplicitEulerScheme, MethodOfLinesScheme, ModifiedCraigSneydScheme,
    TrBdf2Scheme,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeKind {
    Douglas,
    CraigSneyd,
    ModifiedCraigSneyd,
    Hundsdorfer,
    ExplicitEuler,
    ImplicitEuler,
    CrankNicolson,
    MethodOfLines,
    TrBdf2,
}

impl SchemeKind {
    pub const ALL: [SchemeKind; 9] = [
        Self::Douglas,
        Self::CraigSneyd,
        Self::ModifiedCraigSneyd,
        Self::Hundsdorfer,
        Self::ExplicitEuler,
        Self::ImplicitEuler,
        Self::CrankNicolson,
        Self::MethodOfLines,
        Self::TrBdf2,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Douglas => "douglas",
            Self::CraigSneyd => "craig_sneyd",
            Self::ModifiedCraigSneyd => "modified_craig_sneyd",
            Self::Hundsdorfer => "hundsdorfer",
            Self::ExplicitEuler => "explicit_euler",
            Self::ImplicitEuler => "implicit_euler",
            Self::CrankNicolson => "crank_nicolson",
            Self::MethodOfLines => "method_of_lines",
            Self::TrBdf2 => "tr_bdf2",
        }
    }
}

impl std::fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SchemeKind {
    type Err = FdmError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let normalized = key.to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized || kind.as_str().replace('_', "") == normalized)
            .ok_or_else(|| FdmError::InvalidInput(format!("unknown scheme type `{key}`")))
    }
}

/// Scheme kind plus parameters.
///
/// `theta` and `mu` carry the scheme-specific pair: `(θ, μ)` for the ADI
/// family, `(θ, -)` for Crank-Nicolson, `(eps, rel_init_step_size)` for the
/// method of lines and `(α, -)` for TR-BDF2. Euler schemes ignore both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchemeDesc {
    pub kind: SchemeKind,
    #[serde(default)]
    pub theta: f64,
    #[serde(default)]
    pub mu: f64,
}

impl Default for SchemeDesc {
    fn default() -> Self {
        Self::douglas()
    }
}

impl SchemeDesc {
    pub fn new(kind: SchemeKind, theta: f64, mu: f64) -> Self {
        Self { kind, theta, mu }
    }

    pub fn douglas() -> Self {
        Self::new(SchemeKind::Douglas, 0.5, 0.0)
    }

    pub fn craig_sneyd() -> Self {
        Self::new(SchemeKind::CraigSneyd, 0.5, 0.5)
    }

    pub fn modified_craig_sneyd() -> Self {
        Self::new(
            SchemeKind::ModifiedCraigSneyd,
            ModifiedCraigSneydScheme::DEFAULT_THETA,
            ModifiedCraigSneydScheme::DEFAULT_MU,
        )
    }

    pub fn hundsdorfer() -> Self {
        Self::new(
            SchemeKind::Hundsdorfer,
            HundsdorferScheme::DEFAULT_THETA,
            HundsdorferScheme::DEFAULT_MU,
        )
    }

    /// Modified Hundsdorfer-Verwer parameters (`θ = 1 - √2/2`).
    pub fn modified_hundsdorfer() -> Self {
        Self::new(
            SchemeKind::Hundsdorfer,
            1.0 - std::f64::consts::FRAC_1_SQRT_2,
            0.5,
        )
    }

    pub fn explicit_euler() -> Self {
        Self::new(SchemeKind::ExplicitEuler, 0.0, 0.0)
    }

    pub fn implicit_euler() -> Self {
        Self::new(SchemeKind::ImplicitEuler, 0.0, 0.0)
    }

    pub fn crank_nicolson() -> Self {
        Self::new(SchemeKind::CrankNicolson, 0.5, 0.0)
    }

    pub fn method_of_lines() -> Self {
        Self::new(
            SchemeKind::MethodOfLines,
            MethodOfLinesScheme::DEFAULT_EPS,
            MethodOfLinesScheme::DEFAULT_REL_INIT_STEP_SIZE,
        )
    }

    pub fn trbdf2() -> Self {
        Self::new(
            SchemeKind::TrBdf2,
            TrBdf2Scheme::<CrankNicolsonScheme>::DEFAULT_ALPHA,
            0.0,
        )
    }

    pub fn validate(&self) -> Result<(), FdmError> {
        if !self.theta.is_finite() || !self.mu.is_finite() {
            return Err(FdmError::InvalidInput(format!(
                "{}: scheme parameters must be finite",
                self.kind
            )));
        }
        match self.kind {
            SchemeKind::Douglas
            | SchemeKind::CraigSneyd
            | SchemeKind::ModifiedCraigSneyd
            | SchemeKind::Hundsdorfer
            | SchemeKind::CrankNicolson => {
                if !(0.0..=1.0).contains(&self.theta) {
                    return Err(FdmError::InvalidInput(format!(
                        "{}: theta must be in [0, 1], got {}",
                        self.kind, self.theta
                    )));
                }
            }
            SchemeKind::MethodOfLines => {
                if self.theta <= 0.0 || self.mu <= 0.0 {
                    return Err(FdmError::InvalidInput(format!(
                        "{}: eps and relative initial step size must be > 0",
                        self.kind
                    )));
                }
            }
            SchemeKind::TrBdf2 => {
                if self.theta <= 0.0 || self.theta > 1.0 {
                    return Err(FdmError::InvalidInput(format!(
                        "{}: alpha must be in (0, 1], got {}",
                        self.kind, self.theta
                    )));
                }
            }
            SchemeKind::ExplicitEuler | SchemeKind::ImplicitEuler => {}
        }
        Ok(())
    }
}

/// Builds a configured scheme for an operator and its boundary conditions.
pub trait SchemeFactory {
    fn build(
        &self,
        op: SharedOperator,
        bc_set: BoundaryConditionSet,
        settings: SolverSettings,
    ) -> Result<Box<dyn FdmScheme>, FdmError>;
}

impl SchemeFactory for SchemeDesc {
    fn build(
        &self,
        op: SharedOperator,
        bc_set: BoundaryConditionSet,
        settings: SolverSettings,
    ) -> Result<Box<dyn FdmScheme>, FdmError> {
        self.validate()?;
        settings.validate()?;
        log::debug!(
            "building {} scheme (theta={}, mu={}, solver={})",
            self.kind,
            self.theta,
            self.mu,
            settings.solver_type
        );

        let scheme: Box<dyn FdmScheme> = match self.kind {
            SchemeKind::Douglas => Box::new(DouglasScheme::new(self.theta, op, bc_set)),
            SchemeKind::CraigSneyd => {
                Box::new(CraigSneydScheme::new(self.theta, self.mu, op, bc_set))
            }
            SchemeKind::ModifiedCraigSneyd => Box::new(ModifiedCraigSneydScheme::new(
                self.theta, self.mu, op, bc_set,
            )),
            SchemeKind::Hundsdorfer => {
                Box::new(HundsdorferScheme::new(self.theta, self.mu, op, bc_set))
            }
            SchemeKind::ExplicitEuler => Box::new(ExplicitEulerScheme::new(op, bc_set)),
            SchemeKind::ImplicitEuler => {
                Box::new(ImplicitEulerScheme::new(op, bc_set).with_settings(settings))
            }
            SchemeKind::CrankNicolson => Box::new(
                CrankNicolsonScheme::new(self.theta, op, bc_set).with_settings(settings),
            ),
            SchemeKind::MethodOfLines => Box::new(MethodOfLinesScheme::new(
                self.theta, self.mu, op, bc_set,
            )),
            SchemeKind::TrBdf2 => {
                let trapezoidal =
                    CrankNicolsonScheme::new(0.5, op.clone(), bc_set.clone()).with_settings(settings);
                Box::new(
                    TrBdf2Scheme::new(self.theta, op, trapezoidal, bc_set).with_settings(settings),
                )
            }
        };
        Ok(scheme)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::core::Array;
    use crate::engines::pde::operator::TripleBandOp;

    #[test]
    fn kind_parses_display_names_and_aliases() {
        for kind in SchemeKind::ALL {
            assert_eq!(kind.as_str().parse::<SchemeKind>().unwrap(), kind);
        }
        assert_eq!("TrBDF2".parse::<SchemeKind>().unwrap(), SchemeKind::TrBdf2);
        assert_eq!(
            "Modified-Craig-Sneyd".parse::<SchemeKind>().unwrap(),
            SchemeKind::ModifiedCraigSneyd
        );
        assert!("runge_kutta".parse::<SchemeKind>().is_err());
    }

    #[test]
    fn named_constructors_carry_default_parameters() {
        let mcs = SchemeDesc::modified_craig_sneyd();
        assert_abs_diff_eq!(mcs.theta, 1.0 / 3.0);
        assert_abs_diff_eq!(mcs.mu, 1.0 / 3.0);

        let hv = SchemeDesc::hundsdorfer();
        assert_abs_diff_eq!(hv.theta, 0.5 + 3.0_f64.sqrt() / 6.0, epsilon = 1.0e-15);

        let trbdf2 = SchemeDesc::trbdf2();
        assert_abs_diff_eq!(trbdf2.theta, 2.0 - 2.0_f64.sqrt(), epsilon = 1.0e-15);

        let mol = SchemeDesc::method_of_lines();
        assert_eq!((mol.theta, mol.mu), (1.0e-3, 1.0e-2));
    }

    #[test]
    fn validate_rejects_out_of_range_parameters() {
        assert!(SchemeDesc::new(SchemeKind::Douglas, 1.5, 0.0).validate().is_err());
        assert!(SchemeDesc::new(SchemeKind::MethodOfLines, 0.0, 0.01).validate().is_err());
        assert!(SchemeDesc::new(SchemeKind::TrBdf2, 0.0, 0.0).validate().is_err());
        assert!(SchemeDesc::new(SchemeKind::CraigSneyd, f64::NAN, 0.5).validate().is_err());
        assert!(SchemeDesc::implicit_euler().validate().is_ok());
    }

    #[test]
    fn deserializes_from_config() {
        let desc: SchemeDesc =
            serde_json::from_str(r#"{"kind":"craig_sneyd","theta":0.5,"mu":0.5}"#).unwrap();
        assert_eq!(desc, SchemeDesc::craig_sneyd());

        let desc: SchemeDesc = serde_json::from_str(r#"{"kind":"implicit_euler"}"#).unwrap();
        assert_eq!(desc.kind, SchemeKind::ImplicitEuler);
    }

    #[test]
    fn builds_every_kind_and_decays() {
        let descs = [
            SchemeDesc::douglas(),
            SchemeDesc::craig_sneyd(),
            SchemeDesc::modified_craig_sneyd(),
            SchemeDesc::hundsdorfer(),
            SchemeDesc::explicit_euler(),
            SchemeDesc::implicit_euler(),
            SchemeDesc::crank_nicolson(),
            SchemeDesc::method_of_lines(),
            SchemeDesc::trbdf2(),
        ];
        let op: SharedOperator = Arc::new(TripleBandOp::uniform(1, 0.0, -1.0, 0.0).unwrap());
        for desc in descs {
            let mut scheme = desc
                .build(op.clone(), BoundaryConditionSet::new(), SolverSettings::default())
                .unwrap();
            scheme.set_step(0.1);
            let mut a = Array::from_element(1, 1.0);
            scheme.step(&mut a, 1.0).unwrap();
            assert!(
                (a[0] - (-0.1_f64).exp()).abs() < 6.0e-3,
                "{}: {}",
                desc.kind,
                a[0]
            );
        }
    }

    #[test]
    fn build_propagates_validation_errors() {
        let op: SharedOperator = Arc::new(TripleBandOp::uniform(1, 0.0, -1.0, 0.0).unwrap());
        let bad = SchemeDesc::new(SchemeKind::Douglas, -0.1, 0.0);
        assert!(
            bad.build(op.clone(), BoundaryConditionSet::new(), SolverSettings::default())
                .is_err()
        );
        let settings = SolverSettings::default().with_rel_tol(0.0);
        assert!(
            SchemeDesc::douglas()
                .build(op, BoundaryConditionSet::new(), settings)
                .is_err()
        );
    }
}
