#![allow(dead_code)]

use ferric_fdm::core::{Array, FdmError};
use ferric_fdm::engines::pde::{FdmLinearOpComposite, TripleBandOp};

/// `u_xx + u_yy + c·u_xy` on the interior of an `n x n` grid over the unit
/// square, zero outside. Index `i + n·j` runs fastest along x.
pub struct Heat2dOp {
    n: usize,
    h: f64,
    mixed: f64,
    line: TripleBandOp,
}

impl Heat2dOp {
    pub fn new(n: usize, mixed: f64) -> Self {
        let h = 1.0 / (n + 1) as f64;
        let c = 1.0 / (h * h);
        Self {
            n,
            h,
            mixed,
            line: TripleBandOp::uniform(n, c, -2.0 * c, c).expect("valid stencil"),
        }
    }

    pub fn len(&self) -> usize {
        self.n * self.n
    }

    pub fn index(&self, i: usize, j: usize) -> usize {
        i + self.n * j
    }

    /// Samples `f(x, y)` on the interior grid.
    pub fn sample(&self, f: impl Fn(f64, f64) -> f64) -> Array {
        let mut out = Array::zeros(self.len());
        for j in 0..self.n {
            for i in 0..self.n {
                out[self.index(i, j)] = f((i + 1) as f64 * self.h, (j + 1) as f64 * self.h);
            }
        }
        out
    }

    /// Eigenvalue of the 1-D second difference for the lowest sine mode.
    pub fn lowest_line_eigenvalue(&self) -> f64 {
        let s = (std::f64::consts::PI * self.h / 2.0).sin();
        -4.0 / (self.h * self.h) * s * s
    }

    fn line_index(&self, direction: usize, line: usize, k: usize) -> usize {
        if direction == 0 {
            self.index(k, line)
        } else {
            self.index(line, k)
        }
    }

    fn map_lines<F>(&self, direction: usize, r: &Array, f: F) -> Result<Array, FdmError>
    where
        F: Fn(&Array) -> Result<Array, FdmError>,
    {
        if r.len() != self.len() {
            return Err(FdmError::InvalidInput("heat2d: dimension mismatch".to_string()));
        }
        let mut out = Array::zeros(self.len());
        for line in 0..self.n {
            let values = Array::from_iterator(
                self.n,
                (0..self.n).map(|k| r[self.line_index(direction, line, k)]),
            );
            let mapped = f(&values)?;
            for (k, v) in mapped.iter().enumerate() {
                out[self.line_index(direction, line, k)] = *v;
            }
        }
        Ok(out)
    }

    fn at(&self, r: &Array, i: isize, j: isize) -> f64 {
        let n = self.n as isize;
        if (0..n).contains(&i) && (0..n).contains(&j) {
            r[self.index(i as usize, j as usize)]
        } else {
            0.0
        }
    }
}

impl FdmLinearOpComposite for Heat2dOp {
    fn size(&self) -> usize {
        2
    }

    fn set_time(&self, _t1: f64, _t2: f64) {}

    fn apply(&self, r: &Array) -> Result<Array, FdmError> {
        Ok(self.apply_direction(0, r)? + self.apply_direction(1, r)? + self.apply_mixed(r)?)
    }

    fn apply_mixed(&self, r: &Array) -> Result<Array, FdmError> {
        let mut out = Array::zeros(self.len());
        if self.mixed == 0.0 {
            return Ok(out);
        }
        let k = self.mixed / (4.0 * self.h * self.h);
        for j in 0..self.n as isize {
            for i in 0..self.n as isize {
                out[self.index(i as usize, j as usize)] = k
                    * (self.at(r, i + 1, j + 1) - self.at(r, i + 1, j - 1)
                        - self.at(r, i - 1, j + 1)
                        + self.at(r, i - 1, j - 1));
            }
        }
        Ok(out)
    }

    fn apply_direction(&self, direction: usize, r: &Array) -> Result<Array, FdmError> {
        self.map_lines(direction, r, |line| self.line.mult(line))
    }

    fn solve_splitting(&self, direction: usize, r: &Array, s: f64) -> Result<Array, FdmError> {
        self.map_lines(direction, r, |line| self.line.solve(line, s))
    }

    fn preconditioner(&self, r: &Array, s: f64) -> Result<Array, FdmError> {
        let y = self.solve_splitting(1, r, s)?;
        self.solve_splitting(0, &y, s)
    }
}

/// Smooth initial state vanishing on the boundary.
pub fn bump(x: f64, y: f64) -> f64 {
    x * (1.0 - x) * y * (1.0 - y) * (1.0 + x + 2.0 * y)
}

pub fn sine_mode(x: f64, y: f64) -> f64 {
    (std::f64::consts::PI * x).sin() * (std::f64::consts::PI * y).sin()
}

/// Max-norm distance relative to the max-norm of `reference`.
pub fn rel_max_diff(a: &Array, reference: &Array) -> f64 {
    (a - reference).amax() / reference.amax()
}
