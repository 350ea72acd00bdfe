//! Penalized least-squares smoothing spline
//!
//! Fits a low-degree B-spline through scattered (x, y) samples, trading
//! exact interpolation for reduced roughness. The smoothing factor `s`
//! bounds the residual sum of squares: among candidate fits, the smoothest
//! one whose residual stays within `s` is selected, so roughness tolerance
//! grows with the smoothing factor rather than staying fixed.
//!
//! Implementation is a P-spline: quadratic (or configurable degree) B-spline
//! basis on uniform clamped knots, a second-difference penalty on the
//! coefficients, and a bisection search for the largest penalty weight whose
//! residual sum of squares is still <= `s`. Outside the fitted domain the
//! spline extends its boundary values as constants.

use crate::error::{Result, TempotraceError};
use ndarray::{Array1, Array2};

/// Cap on the number of basis functions; the penalty handles smoothing, so
/// the basis only needs enough flexibility to follow genuine tempo drift.
const MAX_BASIS: usize = 32;

/// Penalty-weight search bounds. The upper cap keeps the normal equations
/// well conditioned; at the cap the fit saturates to the least-squares line.
const LAMBDA_MIN: f64 = 1e-9;
const LAMBDA_MAX: f64 = 1e8;

/// Bisection iterations on the log of the penalty weight
const LAMBDA_SEARCH_ITERS: usize = 60;

/// A fitted smoothing spline with constant extension outside its domain
#[derive(Debug, Clone)]
pub struct SmoothingSpline {
    degree: usize,
    knots: Vec<f64>,
    coefs: Vec<f64>,
    domain: (f64, f64),
}

impl SmoothingSpline {
    /// Fit a smoothing spline of the given degree through `(x, y)` samples
    ///
    /// `x` must be strictly increasing. Requires at least `degree + 1`
    /// samples; fewer is an `InsufficientData` error. `smoothing` is the
    /// residual-sum-of-squares budget (larger = smoother curve).
    pub fn fit(x: &[f64], y: &[f64], degree: usize, smoothing: f64) -> Result<Self> {
        let n = x.len();
        if n != y.len() {
            return Err(TempotraceError::AnalysisError {
                path: std::path::PathBuf::new(),
                reason: format!("Spline input length mismatch: {} x vs {} y", n, y.len()),
            });
        }
        if degree == 0 {
            return Err(TempotraceError::ConfigError(
                "Spline degree must be at least 1".to_string(),
            ));
        }
        if n < degree + 1 {
            return Err(TempotraceError::InsufficientData {
                have: n,
                need: degree + 1,
            });
        }
        if x.windows(2).any(|w| w[1] <= w[0]) {
            return Err(TempotraceError::AnalysisError {
                path: std::path::PathBuf::new(),
                reason: "Spline abscissae must be strictly increasing".to_string(),
            });
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(TempotraceError::AnalysisError {
                path: std::path::PathBuf::new(),
                reason: "Spline input contains non-finite values".to_string(),
            });
        }

        let domain = (x[0], x[n - 1]);
        let num_coefs = n.min(MAX_BASIS).max(degree + 1);
        let knots = clamped_uniform_knots(domain, num_coefs, degree);

        // Design matrix: one row of basis values per sample
        let mut design = Array2::<f64>::zeros((n, num_coefs));
        for (row, &t) in x.iter().enumerate() {
            let span = find_span(t, degree, num_coefs, &knots);
            let values = basis_functions(span, t, degree, &knots);
            for (r, &v) in values.iter().enumerate() {
                design[[row, span - degree + r]] = v;
            }
        }

        let y_vec = Array1::from(y.to_vec());
        let btb = design.t().dot(&design);
        let bty = design.t().dot(&y_vec);
        let penalty = second_difference_penalty(num_coefs);

        // Ridge keeps the normal matrix positive definite when samples are
        // sparse relative to the basis.
        let ridge = 1e-9 * (btb.diag().sum() / num_coefs as f64 + 1.0);

        let solve_for = |lambda: f64| -> Result<(Vec<f64>, f64)> {
            let mut system = btb.clone() + &(penalty.clone() * lambda);
            for i in 0..num_coefs {
                system[[i, i]] += ridge;
            }
            let coefs = solve_spd(system, &bty)?;
            let mut ssr = 0.0;
            for row in 0..n {
                let mut fitted = 0.0;
                for col in 0..num_coefs {
                    fitted += design[[row, col]] * coefs[col];
                }
                let r = y_vec[row] - fitted;
                ssr += r * r;
            }
            Ok((coefs, ssr))
        };

        // Residual grows monotonically with the penalty weight: pick the
        // largest weight whose residual stays within the smoothing budget.
        let (coefs_lo, ssr_lo) = solve_for(LAMBDA_MIN)?;
        let coefs = if ssr_lo > smoothing {
            // Even the near-unpenalized fit misses the budget; best effort
            coefs_lo
        } else {
            let (coefs_hi, ssr_hi) = solve_for(LAMBDA_MAX)?;
            if ssr_hi <= smoothing {
                coefs_hi
            } else {
                let mut lo = LAMBDA_MIN.ln();
                let mut hi = LAMBDA_MAX.ln();
                let mut best = coefs_lo;
                for _ in 0..LAMBDA_SEARCH_ITERS {
                    let mid = 0.5 * (lo + hi);
                    let (c, ssr) = solve_for(mid.exp())?;
                    if ssr <= smoothing {
                        best = c;
                        lo = mid;
                    } else {
                        hi = mid;
                    }
                }
                best
            }
        };

        Ok(Self {
            degree,
            knots,
            coefs,
            domain,
        })
    }

    /// Evaluate the spline at time `t`
    ///
    /// Outside the fitted domain the boundary value is extended as a
    /// constant; no linear or periodic extrapolation.
    pub fn eval(&self, t: f64) -> f64 {
        let t = t.clamp(self.domain.0, self.domain.1);
        let span = find_span(t, self.degree, self.coefs.len(), &self.knots);
        let values = basis_functions(span, t, self.degree, &self.knots);
        values
            .iter()
            .enumerate()
            .map(|(r, &v)| v * self.coefs[span - self.degree + r])
            .sum()
    }

    /// Fitted domain `(first, last)` of the sample abscissae
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

/// Clamped knot vector with uniformly spaced interior knots
fn clamped_uniform_knots(domain: (f64, f64), num_coefs: usize, degree: usize) -> Vec<f64> {
    let (start, end) = domain;
    let num_interior = num_coefs - degree - 1;
    let mut knots = Vec::with_capacity(num_coefs + degree + 1);
    knots.extend(std::iter::repeat(start).take(degree + 1));
    for i in 1..=num_interior {
        let frac = i as f64 / (num_interior + 1) as f64;
        knots.push(start + frac * (end - start));
    }
    knots.extend(std::iter::repeat(end).take(degree + 1));
    knots
}

/// Locate the knot span containing `t` (NURBS book A2.1)
fn find_span(t: f64, degree: usize, num_coefs: usize, knots: &[f64]) -> usize {
    // t == end lands in the last non-empty span
    if t >= knots[num_coefs] {
        return num_coefs - 1;
    }
    let mut lo = degree;
    let mut hi = num_coefs;
    let mut mid = (lo + hi) / 2;
    while t < knots[mid] || t >= knots[mid + 1] {
        if t < knots[mid] {
            hi = mid;
        } else {
            lo = mid;
        }
        mid = (lo + hi) / 2;
    }
    mid
}

/// Evaluate the `degree + 1` nonzero basis functions at `t` (NURBS book A2.2)
fn basis_functions(span: usize, t: f64, degree: usize, knots: &[f64]) -> Vec<f64> {
    let mut values = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    values[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let denom = right[r + 1] + left[j - r];
            let temp = if denom != 0.0 { values[r] / denom } else { 0.0 };
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }

    values
}

/// Second-difference roughness penalty `D2' * D2` on the coefficients
fn second_difference_penalty(num_coefs: usize) -> Array2<f64> {
    let mut penalty = Array2::<f64>::zeros((num_coefs, num_coefs));
    if num_coefs < 3 {
        return penalty;
    }
    for r in 0..num_coefs - 2 {
        let row = [(r, 1.0), (r + 1, -2.0), (r + 2, 1.0)];
        for &(i, vi) in &row {
            for &(j, vj) in &row {
                penalty[[i, j]] += vi * vj;
            }
        }
    }
    penalty
}

/// Solve a symmetric positive-definite system via Cholesky decomposition
fn solve_spd(mut a: Array2<f64>, b: &Array1<f64>) -> Result<Vec<f64>> {
    let n = b.len();

    // In-place lower-triangular Cholesky factorization
    for j in 0..n {
        for k in 0..j {
            let l_jk = a[[j, k]];
            for i in j..n {
                a[[i, j]] -= a[[i, k]] * l_jk;
            }
        }
        let pivot = a[[j, j]];
        if pivot <= 0.0 || !pivot.is_finite() {
            return Err(TempotraceError::AnalysisError {
                path: std::path::PathBuf::new(),
                reason: "Spline normal equations are not positive definite".to_string(),
            });
        }
        let scale = pivot.sqrt();
        for i in j..n {
            a[[i, j]] /= scale;
        }
    }

    // Forward substitution: L z = b
    let mut z = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for k in 0..i {
            sum -= a[[i, k]] * z[k];
        }
        z[i] = sum / a[[i, i]];
    }

    // Back substitution: L' c = z
    let mut c = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = z[i];
        for k in i + 1..n {
            sum -= a[[k, i]] * c[k];
        }
        c[i] = sum / a[[i, i]];
    }

    Ok(c)
}
