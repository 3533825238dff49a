//! Band-limited transform interface and a reference spherical-harmonic backend.
//!
//! The concentration machinery only talks to [`SignalTransform`]. Production
//! setups plug in their own harmonic library; [`EquiangularTransform`] is a
//! self-contained implementation on an equiangular grid that is exact for
//! band-limited signals when the grid has at least `2L - 1` rings.

pub mod equiangular;
pub mod legendre;
pub mod rotation;

pub use equiangular::EquiangularTransform;
pub use rotation::EulerAngles;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rustfft::num_complex::Complex64;

use crate::error::{Result, SlepianError};

/// Flat index of the harmonic `(ell, m)`: `ell^2 + ell + m`.
#[inline]
pub fn elm2ind(ell: usize, m: i64) -> usize {
    ((ell * ell + ell) as i64 + m) as usize
}

/// Inverse of [`elm2ind`].
#[inline]
pub fn ind2elm(index: usize) -> (usize, i64) {
    let mut ell = (index as f64).sqrt() as usize;
    // guard against rounding on perfect squares
    while ell * ell > index {
        ell -= 1;
    }
    while (ell + 1) * (ell + 1) <= index {
        ell += 1;
    }
    (ell, index as i64 - (ell * ell + ell) as i64)
}

/// Equiangular sampling positions: `n_theta` colatitude rings at ring
/// midpoints and `n_phi = 2 n_theta - 1` longitudes.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingGrid {
    thetas: Array1<f64>,
    phis: Array1<f64>,
}

impl SamplingGrid {
    pub fn equiangular(resolution: usize) -> Result<Self> {
        if resolution == 0 {
            return Err(SlepianError::config("resolution", "must be at least 1"));
        }
        let n_theta = resolution;
        let n_phi = 2 * resolution - 1;
        let thetas = Array1::from_shape_fn(n_theta, |t| {
            std::f64::consts::PI * (2 * t + 1) as f64 / (2 * n_theta) as f64
        });
        let phis = Array1::from_shape_fn(n_phi, |p| {
            2.0 * std::f64::consts::PI * p as f64 / n_phi as f64
        });
        Ok(Self { thetas, phis })
    }

    pub fn thetas(&self) -> &Array1<f64> {
        &self.thetas
    }

    pub fn phis(&self) -> &Array1<f64> {
        &self.phis
    }

    /// `(n_theta, n_phi)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.thetas.len(), self.phis.len())
    }

    pub fn delta_theta(&self) -> f64 {
        std::f64::consts::PI / self.thetas.len() as f64
    }

    pub fn delta_phi(&self) -> f64 {
        2.0 * std::f64::consts::PI / self.phis.len() as f64
    }

    /// Builds a grid-shaped array from a function of `(theta, phi)`.
    pub fn map<T, F>(&self, f: F) -> Array2<T>
    where
        F: Fn(f64, f64) -> T,
    {
        Array2::from_shape_fn(self.shape(), |(t, p)| f(self.thetas[t], self.phis[p]))
    }
}

/// Band-limited transform between coefficient space and sample space.
///
/// Coefficients are indexed with [`elm2ind`]; fields are sampled on
/// [`SignalTransform::grid`].
pub trait SignalTransform: Send + Sync {
    /// Bandlimit `L`; the coefficient space has `L^2` entries.
    fn bandlimit(&self) -> usize;

    /// Grid on which fields are sampled.
    fn grid(&self) -> &SamplingGrid;

    fn forward(&self, field: ArrayView2<'_, Complex64>) -> Result<Array1<Complex64>>;

    fn inverse(&self, flm: ArrayView1<'_, Complex64>) -> Result<Array2<Complex64>>;

    /// Coefficients of the `index`-th basis function.
    fn create_basis_function(&self, index: usize) -> Result<Array1<Complex64>> {
        let size = self.bandlimit() * self.bandlimit();
        if index >= size {
            return Err(SlepianError::config(
                "index",
                format!("basis index {index} outside coefficient space of size {size}"),
            ));
        }
        let mut flm = Array1::zeros(size);
        flm[index] = Complex64::new(1.0, 0.0);
        Ok(flm)
    }

    fn rotate(
        &self,
        flm: ArrayView1<'_, Complex64>,
        angles: EulerAngles,
    ) -> Result<Array1<Complex64>> {
        let _ = (flm, angles);
        Err(SlepianError::Unsupported(
            "rotation is not provided by this transform".into(),
        ))
    }
}

pub(crate) fn check_coefficients(len: usize, bandlimit: usize) -> Result<()> {
    if len != bandlimit * bandlimit {
        return Err(SlepianError::Dimension {
            what: "harmonic coefficients",
            expected: bandlimit * bandlimit,
            actual: len,
        });
    }
    Ok(())
}
