use std::fmt;
use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use num_traits::Zero;
use rustfft::num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

use super::legendre::{legendre_table, triangular_index};
use super::rotation::{rotate_flm, EulerAngles};
use super::{check_coefficients, elm2ind, SamplingGrid, SignalTransform};
use crate::error::{Result, SlepianError};
use crate::quadrature::{colatitude_weights, QuadratureRule};

/// Spherical-harmonic transform on an equiangular grid.
///
/// Azimuthal sums go through `rustfft`; colatitude sums use tabulated
/// Legendre values and Fejér weights, so `forward(inverse(flm)) == flm`
/// whenever `resolution >= 2L - 1`.
pub struct EquiangularTransform {
    bandlimit: usize,
    grid: SamplingGrid,
    legendre: Vec<Vec<f64>>,
    ring_weights: Array1<f64>,
    fft_forward: Arc<dyn Fft<f64>>,
    fft_inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for EquiangularTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EquiangularTransform")
            .field("bandlimit", &self.bandlimit)
            .field("shape", &self.grid.shape())
            .finish()
    }
}

impl EquiangularTransform {
    pub fn new(bandlimit: usize, resolution: usize) -> Result<Self> {
        if bandlimit == 0 {
            return Err(SlepianError::config("bandlimit", "must be at least 1"));
        }
        if resolution < bandlimit {
            return Err(SlepianError::config(
                "resolution",
                format!("resolution {resolution} is below the bandlimit {bandlimit}"),
            ));
        }
        let grid = SamplingGrid::equiangular(resolution)?;
        let legendre = grid
            .thetas()
            .iter()
            .map(|theta| legendre_table(bandlimit, theta.cos()))
            .collect();
        let ring_weights = colatitude_weights(QuadratureRule::Fejer, &grid) * grid.delta_phi();
        let n_phi = grid.shape().1;
        let mut planner = FftPlanner::new();
        let fft_forward = planner.plan_fft_forward(n_phi);
        let fft_inverse = planner.plan_fft_inverse(n_phi);
        Ok(Self {
            bandlimit,
            grid,
            legendre,
            ring_weights,
            fft_forward,
            fft_inverse,
        })
    }
}

impl SignalTransform for EquiangularTransform {
    fn bandlimit(&self) -> usize {
        self.bandlimit
    }

    fn grid(&self) -> &SamplingGrid {
        &self.grid
    }

    fn forward(&self, field: ArrayView2<'_, Complex64>) -> Result<Array1<Complex64>> {
        if field.dim() != self.grid.shape() {
            return Err(SlepianError::config(
                "field",
                format!(
                    "field shape {:?} does not match grid {:?}",
                    field.dim(),
                    self.grid.shape()
                ),
            ));
        }
        let l = self.bandlimit;
        let n_phi = self.grid.shape().1;
        let mut flm = Array1::<Complex64>::zeros(l * l);
        let mut ring = vec![Complex64::zero(); n_phi];
        for (t, row) in field.axis_iter(Axis(0)).enumerate() {
            ring.iter_mut().zip(row.iter()).for_each(|(r, v)| *r = *v);
            self.fft_forward.process(&mut ring);
            let weight = self.ring_weights[t];
            let table = &self.legendre[t];
            for m in 0..l {
                let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
                for ell in m..l {
                    let p = table[triangular_index(ell, m)] * weight;
                    flm[elm2ind(ell, m as i64)] += ring[m] * p;
                    if m > 0 {
                        flm[elm2ind(ell, -(m as i64))] += ring[n_phi - m] * (p * sign);
                    }
                }
            }
        }
        Ok(flm)
    }

    fn inverse(&self, flm: ArrayView1<'_, Complex64>) -> Result<Array2<Complex64>> {
        check_coefficients(flm.len(), self.bandlimit)?;
        let l = self.bandlimit;
        let (n_theta, n_phi) = self.grid.shape();
        let mut field = Array2::<Complex64>::zeros((n_theta, n_phi));
        let mut ring = vec![Complex64::zero(); n_phi];
        for (t, mut row) in field.axis_iter_mut(Axis(0)).enumerate() {
            ring.iter_mut().for_each(|r| *r = Complex64::zero());
            let table = &self.legendre[t];
            for m in 0..l {
                let sign = if m % 2 == 0 { 1.0 } else { -1.0 };
                let mut positive = Complex64::zero();
                let mut negative = Complex64::zero();
                for ell in m..l {
                    let p = table[triangular_index(ell, m)];
                    positive += flm[elm2ind(ell, m as i64)] * p;
                    if m > 0 {
                        negative += flm[elm2ind(ell, -(m as i64))] * (p * sign);
                    }
                }
                ring[m] = positive;
                if m > 0 {
                    ring[n_phi - m] = negative;
                }
            }
            self.fft_inverse.process(&mut ring);
            row.iter_mut().zip(ring.iter()).for_each(|(v, r)| *v = *r);
        }
        Ok(field)
    }

    fn rotate(
        &self,
        flm: ArrayView1<'_, Complex64>,
        angles: EulerAngles,
    ) -> Result<Array1<Complex64>> {
        check_coefficients(flm.len(), self.bandlimit)?;
        Ok(rotate_flm(flm, self.bandlimit, angles))
    }
}
