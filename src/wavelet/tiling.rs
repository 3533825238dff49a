//! Scale-discretised smooth tiling of an index axis.

use ndarray::Array2;

use crate::error::{Result, SlepianError};

/// Trapezoid steps used for the kernel integrals.
const QUAD_STEPS: usize = 300;

/// Smooth kernel of the tiling, supported on `(1/B, 1)`.
fn s2dw(k: f64, b: f64) -> f64 {
    let t = (k - 1.0 / b) * (2.0 * b / (b - 1.0)) - 1.0;
    (-2.0 / (1.0 - t * t)).exp() / k
}

/// Trapezoid rule over `[lo, hi]`; intervals touching a non-finite sample
/// are skipped.
fn quadtrap(lo: f64, hi: f64, b: f64) -> f64 {
    if lo == hi {
        return 0.0;
    }
    let h = (hi - lo) / QUAD_STEPS as f64;
    (0..QUAD_STEPS)
        .map(|i| {
            let f1 = s2dw(lo + i as f64 * h, b);
            let f2 = s2dw(lo + (i + 1) as f64 * h, b);
            if f1.is_finite() && f2.is_finite() {
                (f1 + f2) * h / 2.0
            } else {
                0.0
            }
        })
        .sum()
}

/// `ceil(log_B(axis))` for `b >= 2`.
fn max_scale(axis: usize, b: usize) -> usize {
    if axis <= 1 {
        return 0;
    }
    ((axis as f64).ln() / (b as f64).ln()).ceil() as usize
}

fn check_b(b: usize) -> Result<()> {
    if b < 2 {
        return Err(SlepianError::config("B", format!("wavelet parameter {b} must be at least 2")));
    }
    Ok(())
}

/// Largest scale needed to tile an axis of length `axis`:
/// `ceil(log_B(axis))`.
pub fn j_max(axis: usize, b: usize) -> Result<usize> {
    check_b(b)?;
    Ok(max_scale(axis, b))
}

fn check_tiling(axis: usize, b: usize, j_min: usize) -> Result<usize> {
    if axis == 0 {
        return Err(SlepianError::config("axis", "must be at least 1"));
    }
    let j_max = j_max(axis, b)?;
    if j_min > j_max {
        return Err(SlepianError::config(
            "j_min",
            format!("j_min {j_min} exceeds j_max {j_max} for axis {axis} and B {b}"),
        ));
    }
    Ok(j_max)
}

/// Squared cumulative scaling functions `Phi_j^2` for `j = 0..=j_max + 1`,
/// one row per scale. `b` must already be checked.
fn tiling_phi2(axis: usize, b: usize) -> Array2<f64> {
    let scales = max_scale(axis, b) + 2;
    let bf = b as f64;
    let kappa_norm = quadtrap(1.0 / bf, 1.0, bf);
    Array2::from_shape_fn((scales, axis), |(j, ell)| {
        let upper = bf.powi(j as i32);
        let lower = upper / bf;
        let ell = ell as f64;
        if ell < lower {
            1.0
        } else if ell > upper {
            0.0
        } else {
            quadtrap(ell / upper, 1.0, bf) / kappa_norm
        }
    })
}

/// Generating family `[kappa_0, kappa_{j_min}, .., kappa_{j_max}]` over an
/// axis of length `axis`.
///
/// Row 0 is the scaling function; row `1 + j` is the wavelet at scale
/// `j_min + j`. Squares of all rows sum to one at every index.
pub fn create_kappas(axis: usize, b: usize, j_min: usize) -> Result<Array2<f64>> {
    let j_max = check_tiling(axis, b, j_min)?;
    let phi2 = tiling_phi2(axis, b);
    let mut kappas = Array2::zeros((j_max - j_min + 2, axis));
    for ell in 0..axis {
        kappas[[0, ell]] = phi2[[j_min, ell]].sqrt();
        for j in j_min..=j_max {
            let diff = phi2[[j + 1, ell]] - phi2[[j, ell]];
            kappas[[1 + j - j_min, ell]] = diff.max(0.0).sqrt();
        }
    }
    Ok(kappas)
}
