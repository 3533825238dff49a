//! Seeded white-noise generators for the three coefficient spaces.

use ndarray::{Array1, ArrayView1};
use ndarray_rand::rand::rngs::StdRng;
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand_distr::StandardNormal;
use rustfft::num_complex::Complex64;

use crate::concentration::Coefficient;
use crate::error::{Result, SlepianError};
use crate::harmonic::elm2ind;
use crate::slepian::SlepianBasis;

/// Noise standard deviation giving `snr_in` dB against `signal`:
/// `sigma^2 = 10^(-snr/10) |signal|^2 / denominator`.
pub fn compute_sigma_noise<T: Coefficient>(
    signal: ArrayView1<'_, T>,
    snr_in: f64,
    denominator: usize,
) -> Result<f64> {
    if denominator == 0 {
        return Err(SlepianError::config("denominator", "must be at least 1"));
    }
    let energy: f64 = signal.iter().map(|v| v.modulus_squared()).sum();
    Ok((10f64.powf(-snr_in / 10.0) * energy / denominator as f64).sqrt())
}

/// Gaussian noise source; the same seed reproduces the same draws.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    rng: StdRng,
}

impl NoiseGenerator {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Harmonic noise of a real field: `m = 0` entries are real,
    /// `m > 0` entries are complex with variance `sigma^2` and
    /// `n_{l,-m} = (-1)^m conj(n_{l,m})`.
    pub fn harmonic(&mut self, bandlimit: usize, sigma: f64) -> Array1<Complex64> {
        let mut nlm = Array1::zeros(bandlimit * bandlimit);
        let half = sigma / 2f64.sqrt();
        for ell in 0..bandlimit {
            nlm[elm2ind(ell, 0)] = Complex64::new(sigma * self.normal(), 0.0);
            for m in 1..=ell as i64 {
                let value = Complex64::new(half * self.normal(), half * self.normal());
                let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
                nlm[elm2ind(ell, m)] = value;
                nlm[elm2ind(ell, -m)] = value.conj() * sign;
            }
        }
        nlm
    }

    /// Harmonic noise projected onto a Slepian basis of the sphere.
    pub fn slepian(
        &mut self,
        basis: &SlepianBasis<Complex64>,
        sigma: f64,
    ) -> Result<Array1<Complex64>> {
        let size = basis.dimension();
        let bandlimit = (size as f64).sqrt().round() as usize;
        if bandlimit * bandlimit != size {
            return Err(SlepianError::Dimension {
                what: "harmonic coefficients",
                expected: bandlimit * bandlimit,
                actual: size,
            });
        }
        let nlm = self.harmonic(bandlimit, sigma);
        basis.forward(nlm.view())
    }

    /// Real Gaussian noise on `n` mesh basis coefficients.
    pub fn mesh(&mut self, n: usize, sigma: f64) -> Array1<f64> {
        Array1::from_shape_fn(n, |_| sigma * self.normal())
    }
}
