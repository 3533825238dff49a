use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1};
use pyo3::prelude::*;
use rustfft::num_complex::Complex64;

use crate::denoise::{compute_sigma_noise, DenoisingEngine, NoiseGenerator};
use crate::wavelet::WaveletBank;

create_binding!(create_kappas, crate::wavelet::create_kappas, [xlim, b, j_min], PyArray2);
create_binding!(j_max, crate::wavelet::j_max, [xlim, b], scalar);
create_binding!(split_into_chunks, crate::concentration::split_into_chunks, [end, workers, start], ranges);

/// Hard-threshold denoising of Slepian coefficients.
///
/// Returns the denoised first `shannon` coefficients with the measured
/// input and output SNR in dB.
#[pyfunction]
#[pyo3(signature = (clean, noisy, snr_in, n_sigma, bandlimit, b, j_min, shannon))]
#[allow(clippy::too_many_arguments)]
fn denoise_slepian<'py>(
    py: Python<'py>,
    clean: PyReadonlyArray1<Complex64>,
    noisy: PyReadonlyArray1<Complex64>,
    snr_in: f64,
    n_sigma: f64,
    bandlimit: usize,
    b: usize,
    j_min: usize,
    shannon: usize,
) -> PyResult<(&'py PyArray1<Complex64>, f64, f64)> {
    let bank = WaveletBank::slepian(bandlimit, b, j_min)?;
    let engine = DenoisingEngine::new(&bank, n_sigma)?;
    let report = engine.denoise(clean.as_array(), noisy.as_array(), snr_in, shannon)?;
    Ok((report.denoised.into_pyarray(py), report.snr_in, report.snr_out))
}

/// Seeded harmonic white noise at `snr_in` dB against `signal`.
#[pyfunction]
#[pyo3(signature = (signal, bandlimit, snr_in, seed=30))]
fn create_noise<'py>(
    py: Python<'py>,
    signal: PyReadonlyArray1<Complex64>,
    bandlimit: usize,
    snr_in: f64,
    seed: u64,
) -> PyResult<&'py PyArray1<Complex64>> {
    let sigma = compute_sigma_noise(signal.as_array(), snr_in, bandlimit * bandlimit)?;
    Ok(NoiseGenerator::seeded(seed)
        .harmonic(bandlimit, sigma)
        .into_pyarray(py))
}

pub fn register(m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(create_kappas, m)?)?;
    m.add_function(wrap_pyfunction!(j_max, m)?)?;
    m.add_function(wrap_pyfunction!(split_into_chunks, m)?)?;
    m.add_function(wrap_pyfunction!(denoise_slepian, m)?)?;
    m.add_function(wrap_pyfunction!(create_noise, m)?)?;
    Ok(())
}
