use crate::core::FdmError;

/// In-place tridiagonal solve using pre-allocated scratch buffers.
/// Writes the solution into `out`; `c_star` and `d_star` are scratch space.
pub(super) fn solve_tridiagonal_inplace(
    lower: &[f64],
    diag: &[f64],
    upper: &[f64],
    rhs: &[f64],
    c_star: &mut [f64],
    d_star: &mut [f64],
    out: &mut [f64],
) -> Result<(), FdmError> {
    let n = diag.len();
    if n == 0 {
        return Ok(());
    }
    if lower.len() != n
        || upper.len() != n
        || rhs.len() != n
        || c_star.len() != n
        || d_star.len() != n
        || out.len() != n
    {
        return Err(FdmError::InvalidInput(
            "tridiagonal input lengths must match".to_string(),
        ));
    }

    let inv_denom0 = 1.0 / diag[0];
    if diag[0].abs() <= 1.0e-14 || !inv_denom0.is_finite() {
        return Err(FdmError::NumericalError(
            "tridiagonal solver singular matrix".to_string(),
        ));
    }
    c_star[0] = if n > 1 { upper[0] * inv_denom0 } else { 0.0 };
    d_star[0] = rhs[0] * inv_denom0;

    for i in 1..n {
        // diag[i] - lower[i] * c_star[i-1]
        let denom = (-lower[i]).mul_add(c_star[i - 1], diag[i]);
        if denom.abs() <= 1.0e-14 {
            return Err(FdmError::NumericalError(
                "tridiagonal solver singular matrix".to_string(),
            ));
        }
        let inv_denom = 1.0 / denom;
        c_star[i] = if i < n - 1 { upper[i] * inv_denom } else { 0.0 };
        d_star[i] = (-lower[i]).mul_add(d_star[i - 1], rhs[i]) * inv_denom;
    }

    out[n - 1] = d_star[n - 1];
    for i in (0..n - 1).rev() {
        out[i] = (-c_star[i]).mul_add(out[i + 1], d_star[i]);
    }
    Ok(())
}
