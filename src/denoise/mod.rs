//! Wavelet hard-threshold denoising.
//!
//! The noisy signal is analysed with a [`WaveletBank`], every scale is
//! thresholded at `n_sigma` times its estimated noise level and the result
//! is synthesised again. SNRs before and after are reported in dB.

pub mod noise;

pub use noise::{compute_sigma_noise, NoiseGenerator};

use ndarray::{Array1, ArrayView1};
use tracing::info;

use crate::concentration::Coefficient;
use crate::error::{Result, SlepianError};
use crate::wavelet::{WaveletBank, WaveletCoefficients};

/// `10 log10(|signal|^2 / |signal - estimate|^2)` in dB.
pub fn compute_snr<T: Coefficient>(
    signal: ArrayView1<'_, T>,
    estimate: ArrayView1<'_, T>,
) -> Result<f64> {
    if signal.len() != estimate.len() {
        return Err(SlepianError::Dimension {
            what: "snr estimate",
            expected: signal.len(),
            actual: estimate.len(),
        });
    }
    let power: f64 = signal.iter().map(|v| v.modulus_squared()).sum();
    let residual: f64 = signal
        .iter()
        .zip(estimate.iter())
        .map(|(&s, &e)| (s - e).modulus_squared())
        .sum();
    Ok(10.0 * (power / residual).log10())
}

/// Zeroes every coefficient of bank scale `s` with `|w| < n_sigma * sigmas[s]`.
pub fn hard_threshold<T: Coefficient>(
    coefficients: &mut WaveletCoefficients<T>,
    sigmas: &[f64],
    n_sigma: f64,
) -> Result<()> {
    let scales = coefficients.scales().to_vec();
    for (mut row, scale) in coefficients
        .coefficients_mut()
        .rows_mut()
        .into_iter()
        .zip(scales)
    {
        let sigma = sigmas
            .get(scale)
            .copied()
            .ok_or_else(|| SlepianError::Dimension {
                what: "noise levels",
                expected: scale + 1,
                actual: sigmas.len(),
            })?;
        let threshold = n_sigma * sigma;
        row.mapv_inplace(|w| if w.modulus() < threshold { T::zero() } else { w });
    }
    Ok(())
}

/// Root mean square of `values` over the entries where `filter` is non-zero.
fn rms_on_support(filter: ArrayView1<'_, f64>, values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = filter
        .iter()
        .zip(values)
        .filter(|(k, _)| **k != 0.0)
        .fold((0.0, 0usize), |(sum, count), (_, v)| (sum + v * v, count + 1));
    if count == 0 {
        0.0
    } else {
        (sum / count as f64).sqrt()
    }
}

/// Outcome of one denoising run.
#[derive(Debug, Clone)]
pub struct DenoiseReport<T> {
    /// Denoised coefficients over the first `shannon` entries.
    pub denoised: Array1<T>,
    /// Per-scale noise levels, indexed like the bank's filters.
    pub sigmas: Vec<f64>,
    pub snr_in: f64,
    pub snr_out: f64,
}

/// Hard-threshold denoiser on top of a wavelet bank.
#[derive(Debug, Clone)]
pub struct DenoisingEngine<'a> {
    bank: &'a WaveletBank,
    n_sigma: f64,
}

impl<'a> DenoisingEngine<'a> {
    pub fn new(bank: &'a WaveletBank, n_sigma: f64) -> Result<Self> {
        if n_sigma.is_nan() || n_sigma <= 0.0 {
            return Err(SlepianError::config(
                "n_sigma",
                format!("threshold multiplier must be positive, got {n_sigma}"),
            ));
        }
        Ok(Self { bank, n_sigma })
    }

    pub fn n_sigma(&self) -> f64 {
        self.n_sigma
    }

    /// Noise level of every bank scale over the first `shannon` entries.
    ///
    /// Wavelet scales use the white-noise level `sigma_noise` implied by
    /// `snr_in` scaled by the filter's RMS. The scaling function uses the
    /// realised noise `noisy - clean` seen through it.
    pub fn sigma_j<T: Coefficient>(
        &self,
        clean: ArrayView1<'_, T>,
        noisy: ArrayView1<'_, T>,
        snr_in: f64,
        shannon: usize,
    ) -> Result<Vec<f64>> {
        if clean.len() != noisy.len() {
            return Err(SlepianError::Dimension {
                what: "noisy signal",
                expected: clean.len(),
                actual: noisy.len(),
            });
        }
        if shannon > clean.len() || shannon > self.bank.size() {
            return Err(SlepianError::Dimension {
                what: "denoising length",
                expected: clean.len().min(self.bank.size()),
                actual: shannon,
            });
        }
        let sigma_noise = compute_sigma_noise(clean, snr_in, clean.len())?;
        let filters = self.bank.filters();
        let mut sigmas = Vec::with_capacity(self.bank.n_scales());

        let scaling = filters.row(0);
        let scaling = scaling.slice(ndarray::s![..shannon]);
        let realised = scaling
            .iter()
            .zip(noisy.iter().zip(clean.iter()))
            .map(|(&k, (&n, &c))| k * (n - c).modulus());
        sigmas.push(rms_on_support(scaling, realised));

        for row in filters.rows().into_iter().skip(1) {
            let row = row.slice(ndarray::s![..shannon]);
            sigmas.push(sigma_noise * rms_on_support(row, row.iter().copied()));
        }
        Ok(sigmas)
    }

    /// Denoises `noisy` against the known `clean` signal over the first
    /// `shannon` entries.
    pub fn denoise<T: Coefficient>(
        &self,
        clean: ArrayView1<'_, T>,
        noisy: ArrayView1<'_, T>,
        snr_in: f64,
        shannon: usize,
    ) -> Result<DenoiseReport<T>> {
        let sigmas = self.sigma_j(clean, noisy, snr_in, shannon)?;
        let clean = clean.slice(ndarray::s![..shannon]);
        let noisy = noisy.slice(ndarray::s![..shannon]);
        let measured_in = compute_snr(clean, noisy)?;
        info!(snr_in = measured_in, "SNR_in");

        let mut coefficients = self.bank.forward(noisy, shannon)?;
        hard_threshold(&mut coefficients, &sigmas, self.n_sigma)?;
        let denoised = self.bank.inverse(&coefficients, shannon)?;

        let snr_out = compute_snr(clean, denoised.view())?;
        info!(snr_out, "SNR_out");
        Ok(DenoiseReport {
            denoised,
            sigmas,
            snr_in: measured_in,
            snr_out,
        })
    }
}
