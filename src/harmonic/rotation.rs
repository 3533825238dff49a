use ndarray::{Array1, ArrayView1};
use rustfft::num_complex::Complex64;

use super::elm2ind;

/// Rotation in the zyz Euler convention: first `gamma` about z, then `beta`
/// about y, then `alpha` about z.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
}

impl EulerAngles {
    pub fn new(alpha: f64, beta: f64, gamma: f64) -> Self {
        Self { alpha, beta, gamma }
    }

    /// Rotation that undoes `self`.
    pub fn inverse(&self) -> Self {
        Self::new(-self.gamma, -self.beta, -self.alpha)
    }
}

fn ln_factorials(n: usize) -> Vec<f64> {
    let mut table = vec![0.0; n + 1];
    for k in 1..=n {
        table[k] = table[k - 1] + (k as f64).ln();
    }
    table
}

/// Wigner small-d element `d^ell_{m' m}(beta)`.
pub fn wigner_d(ell: usize, m_prime: i64, m: i64, beta: f64) -> f64 {
    let ln_fact = ln_factorials(2 * ell + 1);
    wigner_d_with(&ln_fact, ell, m_prime, m, beta)
}

fn wigner_d_with(ln_fact: &[f64], ell: usize, m_prime: i64, m: i64, beta: f64) -> f64 {
    let j = ell as i64;
    if m.abs() > j || m_prime.abs() > j {
        return 0.0;
    }
    let f = |n: i64| ln_fact[n as usize];
    let (c, s) = ((beta / 2.0).cos(), (beta / 2.0).sin());
    let norm = 0.5 * (f(j + m_prime) + f(j - m_prime) + f(j + m) + f(j - m));
    let lo = 0.max(m - m_prime);
    let hi = (j + m).min(j - m_prime);
    (lo..=hi)
        .map(|k| {
            let sign = if (m_prime - m + k) % 2 == 0 { 1.0 } else { -1.0 };
            let ln_term =
                norm - f(j + m - k) - f(k) - f(m_prime - m + k) - f(j - m_prime - k);
            sign * ln_term.exp()
                * c.powi((2 * j + m - m_prime - 2 * k) as i32)
                * s.powi((m_prime - m + 2 * k) as i32)
        })
        .sum()
}

/// Applies `D^ell_{m m'}(alpha, beta, gamma)` to every degree of `flm`.
pub fn rotate_flm(
    flm: ArrayView1<'_, Complex64>,
    bandlimit: usize,
    angles: EulerAngles,
) -> Array1<Complex64> {
    let ln_fact = ln_factorials(2 * bandlimit + 1);
    let mut rotated = Array1::<Complex64>::zeros(flm.len());
    for ell in 0..bandlimit {
        let j = ell as i64;
        for m in -j..=j {
            let outer = Complex64::from_polar(1.0, -(m as f64) * angles.alpha);
            let mut acc = Complex64::new(0.0, 0.0);
            for mp in -j..=j {
                let d = wigner_d_with(&ln_fact, ell, m, mp, angles.beta);
                let inner = Complex64::from_polar(1.0, -(mp as f64) * angles.gamma);
                acc += flm[elm2ind(ell, mp)] * inner * d;
            }
            rotated[elm2ind(ell, m)] = outer * acc;
        }
    }
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn sample_flm(l: usize) -> Array1<Complex64> {
        Array1::from_shape_fn(l * l, |i| {
            Complex64::new((1.3 * i as f64).cos(), (0.7 * i as f64).sin())
        })
    }

    #[test]
    fn small_d_closed_forms() {
        let beta = 0.9_f64;
        assert_relative_eq!(wigner_d(1, 0, 0, beta), beta.cos(), epsilon = 1e-14);
        assert_relative_eq!(
            wigner_d(1, 1, 1, beta),
            (1.0 + beta.cos()) / 2.0,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            wigner_d(1, 1, 0, beta),
            -beta.sin() / 2f64.sqrt(),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            wigner_d(2, 0, 0, beta),
            (3.0 * beta.cos().powi(2) - 1.0) / 2.0,
            epsilon = 1e-13
        );
    }

    #[test]
    fn z_rotation_is_a_phase() {
        let l = 4;
        let flm = sample_flm(l);
        let alpha = 0.4;
        let rotated = rotate_flm(flm.view(), l, EulerAngles::new(alpha, 0.0, 0.0));
        for ell in 0..l {
            for m in -(ell as i64)..=(ell as i64) {
                let i = elm2ind(ell, m);
                let expected = flm[i] * Complex64::from_polar(1.0, -(m as f64) * alpha);
                assert_relative_eq!(rotated[i].re, expected.re, epsilon = 1e-12);
                assert_relative_eq!(rotated[i].im, expected.im, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn rotation_preserves_degree_power() {
        let l = 6;
        let flm = sample_flm(l);
        let rotated = rotate_flm(flm.view(), l, EulerAngles::new(0.3, 1.1, -0.8));
        for ell in 0..l {
            let range = elm2ind(ell, -(ell as i64))..=elm2ind(ell, ell as i64);
            let before: f64 = range.clone().map(|i| flm[i].norm_sqr()).sum();
            let after: f64 = range.map(|i| rotated[i].norm_sqr()).sum();
            assert_relative_eq!(before, after, epsilon = 1e-10);
        }
    }

    #[test]
    fn inverse_rotation_round_trips() {
        let l = 5;
        let flm = sample_flm(l);
        let angles = EulerAngles::new(0.5, 2.0, 1.2);
        let there = rotate_flm(flm.view(), l, angles);
        let back = rotate_flm(there.view(), l, angles.inverse());
        for (a, b) in flm.iter().zip(back.iter()) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-10);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-10);
        }
    }

    #[test]
    fn flipping_the_pole_negates_y10() {
        let l = 3;
        let mut flm = Array1::<Complex64>::zeros(l * l);
        flm[elm2ind(1, 0)] = Complex64::new(1.0, 0.0);
        let rotated = rotate_flm(flm.view(), l, EulerAngles::new(0.0, PI, 0.0));
        assert_relative_eq!(rotated[elm2ind(1, 0)].re, -1.0, epsilon = 1e-12);
        assert_relative_eq!(rotated[elm2ind(1, 1)].norm(), 0.0, epsilon = 1e-12);
    }
}
