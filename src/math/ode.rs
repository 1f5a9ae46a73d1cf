//! Adaptive Runge-Kutta integration with the Cash-Karp embedded 4(5) pair.
//!
//! Step sizes are controlled against the scaled error estimate of the embedded
//! pair (Press et al., *Numerical Recipes*, Sec. 16.2). Integration may run
//! forward or backward in time.

use crate::core::{Array, FdmError, check_len};

const MAX_STEPS: usize = 10_000;
const TINY: f64 = 1.0e-30;
const SAFETY: f64 = 0.9;
const P_GROW: f64 = -0.2;
const P_SHRINK: f64 = -0.25;
const ERR_CON: f64 = 1.89e-4;

const A2: f64 = 0.2;
const A3: f64 = 0.3;
const A4: f64 = 0.6;
const A5: f64 = 1.0;
const A6: f64 = 0.875;
const B21: f64 = 0.2;
const B31: f64 = 3.0 / 40.0;
const B32: f64 = 9.0 / 40.0;
const B41: f64 = 0.3;
const B42: f64 = -0.9;
const B43: f64 = 1.2;
const B51: f64 = -11.0 / 54.0;
const B52: f64 = 2.5;
const B53: f64 = -70.0 / 27.0;
const B54: f64 = 35.0 / 27.0;
const B61: f64 = 1631.0 / 55296.0;
const B62: f64 = 175.0 / 512.0;
const B63: f64 = 575.0 / 13824.0;
const B64: f64 = 44275.0 / 110592.0;
const B65: f64 = 253.0 / 4096.0;
const C1: f64 = 37.0 / 378.0;
const C3: f64 = 250.0 / 621.0;
const C4: f64 = 125.0 / 594.0;
const C6: f64 = 512.0 / 1771.0;
const DC1: f64 = C1 - 2825.0 / 27648.0;
const DC3: f64 = C3 - 18575.0 / 48384.0;
const DC4: f64 = C4 - 13525.0 / 55296.0;
const DC5: f64 = -277.0 / 14336.0;
const DC6: f64 = C6 - 0.25;

/// Adaptive Cash-Karp integrator for `dy/dx = f(x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveRungeKutta {
    /// Relative accuracy target per step.
    pub eps: f64,
    /// Initial step size magnitude.
    pub h1: f64,
    /// Smallest admissible step size magnitude.
    pub h_min: f64,
}

impl Default for AdaptiveRungeKutta {
    fn default() -> Self {
        Self {
            eps: 1.0e-6,
            h1: 1.0e-4,
            h_min: 0.0,
        }
    }
}

impl AdaptiveRungeKutta {
    pub fn new(eps: f64, h1: f64) -> Self {
        Self {
            eps,
            h1,
            ..Self::default()
        }
    }

    pub fn with_h_min(mut self, h_min: f64) -> Self {
        self.h_min = h_min;
        self
    }

    /// Integrates from `(x1, y1)` to `x2` and returns `y(x2)`.
    pub fn integrate<F>(&self, mut f: F, y1: &Array, x1: f64, x2: f64) -> Result<Array, FdmError>
    where
        F: FnMut(f64, &Array) -> Result<Array, FdmError>,
    {
        if !self.eps.is_finite() || self.eps <= 0.0 {
            return Err(FdmError::InvalidInput(
                "eps must be finite and > 0".to_string(),
            ));
        }
        if !self.h1.is_finite() || self.h1 <= 0.0 {
            return Err(FdmError::InvalidInput(
                "initial step size must be finite and > 0".to_string(),
            ));
        }

        let mut y = y1.clone();
        if x1 == x2 {
            return Ok(y);
        }

        let mut x = x1;
        let mut h = if x1 <= x2 { self.h1 } else { -self.h1 };

        for _ in 0..MAX_STEPS {
            let dydx = f(x, &y)?;
            check_len("ode derivative", y.len(), dydx.len())?;
            let y_scale = y.zip_map(&dydx, |yi, di| yi.abs() + (di * h).abs() + TINY);

            if (x + h - x2) * (x + h - x1) > 0.0 {
                h = x2 - x;
            }

            let (h_did, h_next) = self.quality_step(&mut f, &mut y, &dydx, x, h, &y_scale)?;
            x += h_did;

            if (x - x2) * (x2 - x1) >= 0.0 {
                return Ok(y);
            }
            if h_next.abs() <= self.h_min {
                return Err(FdmError::NumericalError(format!(
                    "step size ({h_next:e}) too small ({:e} min) in adaptive Runge-Kutta",
                    self.h_min
                )));
            }
            h = h_next;
        }

        Err(FdmError::NumericalError(format!(
            "too many steps ({MAX_STEPS}) in adaptive Runge-Kutta"
        )))
    }

    /// One accepted step; shrinks `h_try` until the error estimate passes.
    fn quality_step<F>(
        &self,
        f: &mut F,
        y: &mut Array,
        dydx: &Array,
        x: f64,
        h_try: f64,
        y_scale: &Array,
    ) -> Result<(f64, f64), FdmError>
    where
        F: FnMut(f64, &Array) -> Result<Array, FdmError>,
    {
        let mut h = h_try;
        loop {
            let (y_tmp, y_err) = cash_karp(f, y, dydx, x, h)?;
            let err_max = y_err
                .iter()
                .zip(y_scale.iter())
                .fold(0.0_f64, |m, (e, s)| m.max((e / s).abs()))
                / self.eps;

            if err_max > 1.0 {
                let h_shrunk = SAFETY * h * err_max.powf(P_SHRINK);
                let h_floor = h / 10.0;
                h = if h >= 0.0 {
                    h_shrunk.max(h_floor)
                } else {
                    h_shrunk.min(h_floor)
                };
                if x + h == x {
                    return Err(FdmError::NumericalError(format!(
                        "step size underflow ({h:e} at x = {x}) in adaptive Runge-Kutta"
                    )));
                }
                continue;
            }

            let h_next = if err_max > ERR_CON {
                SAFETY * h * err_max.powf(P_GROW)
            } else {
                5.0 * h
            };
            *y = y_tmp;
            return Ok((h, h_next));
        }
    }
}

/// Cash-Karp step returning the fifth-order solution and the error estimate.
fn cash_karp<F>(f: &mut F, y: &Array, dydx: &Array, x: f64, h: f64) -> Result<(Array, Array), FdmError>
where
    F: FnMut(f64, &Array) -> Result<Array, FdmError>,
{
    let ak2 = f(x + A2 * h, &(y + dydx * (B21 * h)))?;
    let ak3 = f(x + A3 * h, &(y + (dydx * B31 + &ak2 * B32) * h))?;
    let ak4 = f(x + A4 * h, &(y + (dydx * B41 + &ak2 * B42 + &ak3 * B43) * h))?;
    let ak5 = f(
        x + A5 * h,
        &(y + (dydx * B51 + &ak2 * B52 + &ak3 * B53 + &ak4 * B54) * h),
    )?;
    let ak6 = f(
        x + A6 * h,
        &(y + (dydx * B61 + &ak2 * B62 + &ak3 * B63 + &ak4 * B64 + &ak5 * B65) * h),
    )?;

    let y_out = y + (dydx * C1 + &ak3 * C3 + &ak4 * C4 + &ak6 * C6) * h;
    let y_err = (dydx * DC1 + &ak3 * DC3 + &ak4 * DC4 + &ak5 * DC5 + &ak6 * DC6) * h;
    Ok((y_out, y_err))
}
