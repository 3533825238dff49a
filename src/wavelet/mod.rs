//! Scale-discretised wavelets in Slepian or harmonic coefficient space.
//!
//! A [`WaveletBank`] holds the generating family from [`create_kappas`],
//! laid out over the coefficient axis of its domain. Analysis is a sifting
//! convolution (elementwise filter times signal); synthesis sums the
//! filtered scales back up, which is exact because the filters square-sum
//! to one.

pub mod tiling;

pub use tiling::{create_kappas, j_max};

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use tracing::debug;

use crate::concentration::Coefficient;
use crate::error::{Result, SlepianError};
use crate::harmonic::ind2elm;

/// Coefficient space the filters act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveletDomain {
    /// Slepian coefficients; the filter index is the Slepian rank over
    /// `L^2` entries.
    Slepian,
    /// Axisymmetric harmonic wavelets; the filter index is the degree `ell`
    /// of the harmonic index `ell^2 + ell + m`.
    Harmonic,
}

/// Per-scale coefficients with the scales that survived analysis.
///
/// Row `r` of `coefficients` belongs to filter `scales[r]` of the bank
/// (0 is the scaling function).
#[derive(Debug, Clone, PartialEq)]
pub struct WaveletCoefficients<T> {
    scales: Vec<usize>,
    coefficients: Array2<T>,
}

impl<T> WaveletCoefficients<T> {
    pub fn new(scales: Vec<usize>, coefficients: Array2<T>) -> Result<Self> {
        if scales.len() != coefficients.nrows() {
            return Err(SlepianError::Dimension {
                what: "wavelet scales",
                expected: coefficients.nrows(),
                actual: scales.len(),
            });
        }
        Ok(Self {
            scales,
            coefficients,
        })
    }

    pub fn scales(&self) -> &[usize] {
        &self.scales
    }

    pub fn coefficients(&self) -> ArrayView2<'_, T> {
        self.coefficients.view()
    }

    pub fn coefficients_mut(&mut self) -> &mut Array2<T> {
        &mut self.coefficients
    }

    /// Coefficients of bank filter `scale`, if that scale was kept.
    pub fn scale(&self, scale: usize) -> Option<ArrayView1<'_, T>> {
        self.scales
            .iter()
            .position(|&s| s == scale)
            .map(|r| self.coefficients.row(r))
    }

    /// Number of entries per scale.
    pub fn len(&self) -> usize {
        self.coefficients.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty()
    }
}

/// `out[s][k] = filters[s][k] * signal[k]` for `k < shannon`.
pub fn sifting_convolution<T: Coefficient>(
    filters: ArrayView2<'_, f64>,
    signal: ArrayView1<'_, T>,
    shannon: usize,
) -> Result<Array2<T>> {
    if shannon > signal.len() || shannon > filters.ncols() {
        return Err(SlepianError::Dimension {
            what: "sifting convolution length",
            expected: signal.len().min(filters.ncols()),
            actual: shannon,
        });
    }
    Ok(Array2::from_shape_fn((filters.nrows(), shannon), |(s, k)| {
        signal[k] * T::from_real(filters[[s, k]])
    }))
}

/// Tight frame of one scaling function and `j_max - j_min + 1` wavelets.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveletBank {
    domain: WaveletDomain,
    b: usize,
    j_min: usize,
    j_max: usize,
    kappas: Array2<f64>,
    filters: Array2<f64>,
}

impl WaveletBank {
    /// Bank over the Slepian coefficients of a bandlimit `L` basis.
    pub fn slepian(bandlimit: usize, b: usize, j_min: usize) -> Result<Self> {
        Self::build(WaveletDomain::Slepian, bandlimit * bandlimit, b, j_min, bandlimit * bandlimit)
    }

    /// Bank over a Slepian axis of arbitrary length, e.g. a mesh basis size.
    pub fn slepian_axis(axis: usize, b: usize, j_min: usize) -> Result<Self> {
        Self::build(WaveletDomain::Slepian, axis, b, j_min, axis)
    }

    /// Axisymmetric bank over the harmonic coefficients of bandlimit `L`.
    pub fn harmonic(bandlimit: usize, b: usize, j_min: usize) -> Result<Self> {
        Self::build(WaveletDomain::Harmonic, bandlimit, b, j_min, bandlimit * bandlimit)
    }

    fn build(domain: WaveletDomain, axis: usize, b: usize, j_min: usize, size: usize) -> Result<Self> {
        let kappas = create_kappas(axis, b, j_min)?;
        let filters = match domain {
            WaveletDomain::Slepian => kappas.clone(),
            WaveletDomain::Harmonic => Array2::from_shape_fn((kappas.nrows(), size), |(s, i)| {
                kappas[[s, ind2elm(i).0]]
            }),
        };
        let j_max = j_max(axis, b)?;
        debug!(?domain, axis, b, j_min, j_max, "wavelet bank");
        Ok(Self {
            domain,
            b,
            j_min,
            j_max,
            kappas,
            filters,
        })
    }

    pub fn domain(&self) -> WaveletDomain {
        self.domain
    }

    pub fn b(&self) -> usize {
        self.b
    }

    pub fn j_min(&self) -> usize {
        self.j_min
    }

    pub fn j_max(&self) -> usize {
        self.j_max
    }

    /// Filters over the tiled axis, as returned by [`create_kappas`].
    pub fn kappas(&self) -> ArrayView2<'_, f64> {
        self.kappas.view()
    }

    /// Filters laid out over the coefficient space.
    pub fn filters(&self) -> ArrayView2<'_, f64> {
        self.filters.view()
    }

    /// Number of filters including the scaling function.
    pub fn n_scales(&self) -> usize {
        self.filters.nrows()
    }

    /// Length of the coefficient space.
    pub fn size(&self) -> usize {
        self.filters.ncols()
    }

    /// Filter row of wavelet `j` (counted from `j_min`), or the scaling
    /// function for `None`.
    pub fn filter(&self, j: Option<usize>) -> Result<ArrayView1<'_, f64>> {
        match j {
            None => Ok(self.filters.row(0)),
            Some(j) => {
                self.check_scale(j)?;
                Ok(self.filters.row(j + 1))
            }
        }
    }

    /// `0 <= j <= j_max - j_min`.
    pub fn check_scale(&self, j: usize) -> Result<()> {
        let limit = self.j_max - self.j_min;
        if j > limit {
            return Err(SlepianError::config(
                "j",
                format!("j should be at most j_max - j_min = {limit}, got {j}"),
            ));
        }
        Ok(())
    }

    fn check_shannon(&self, shannon: usize) -> Result<()> {
        if shannon > self.size() {
            return Err(SlepianError::Dimension {
                what: "wavelet coefficient length",
                expected: self.size(),
                actual: shannon,
            });
        }
        Ok(())
    }

    /// Analysis over the first `shannon` entries; scales whose coefficients
    /// are identically zero are dropped.
    pub fn forward<T: Coefficient>(
        &self,
        signal: ArrayView1<'_, T>,
        shannon: usize,
    ) -> Result<WaveletCoefficients<T>> {
        self.check_shannon(shannon)?;
        let all = sifting_convolution(self.filters.view(), signal, shannon)?;
        let scales: Vec<usize> = all
            .rows()
            .into_iter()
            .enumerate()
            .filter(|(_, row)| row.iter().any(|v| !v.is_zero()))
            .map(|(s, _)| s)
            .collect();
        let coefficients = all.select(ndarray::Axis(0), &scales);
        WaveletCoefficients::new(scales, coefficients)
    }

    /// Synthesis `sum_j kappa_j w_j` over the first `shannon` entries.
    pub fn inverse<T: Coefficient>(
        &self,
        coefficients: &WaveletCoefficients<T>,
        shannon: usize,
    ) -> Result<Array1<T>> {
        self.check_shannon(shannon)?;
        if coefficients.len() != shannon {
            return Err(SlepianError::Dimension {
                what: "wavelet coefficients",
                expected: shannon,
                actual: coefficients.len(),
            });
        }
        let mut out = Array1::<T>::zeros(shannon);
        for (row, &scale) in coefficients.coefficients.rows().into_iter().zip(&coefficients.scales) {
            if scale >= self.n_scales() {
                return Err(SlepianError::config(
                    "scale",
                    format!("scale {scale} not in a bank of {} filters", self.n_scales()),
                ));
            }
            let filter = self.filters.slice(s![scale, ..shannon]);
            out.iter_mut()
                .zip(row.iter())
                .zip(filter.iter())
                .for_each(|((acc, &w), &k)| *acc += w * T::from_real(k));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod __test__;
