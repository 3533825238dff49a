//! Slepian bases on the sphere and on meshes.
//!
//! [`SlepianBasis`] owns an eigensolution and maps between ambient
//! coefficients and Slepian coefficients. [`SlepianSphere`] and
//! [`SlepianMesh`] run the pipeline that produces one: region mask, Shannon
//! number, cache lookup, matrix fill and eigensolve.

pub mod mesh;
pub mod sphere;

pub use mesh::SlepianMesh;
pub use sphere::{shannon_number, SlepianSphere};

use ndarray::{s, Array1, ArrayView1, ArrayView2};

use crate::concentration::Coefficient;
use crate::eigen::EigenDecomposition;
use crate::error::{Result, SlepianError};

/// Ranked eigenbasis with its Shannon number.
#[derive(Debug, Clone, PartialEq)]
pub struct SlepianBasis<T> {
    decomposition: EigenDecomposition<T>,
    shannon: usize,
}

impl<T: Coefficient> SlepianBasis<T> {
    pub fn new(decomposition: EigenDecomposition<T>, shannon: usize) -> Self {
        Self {
            decomposition,
            shannon,
        }
    }

    pub fn shannon_number(&self) -> usize {
        self.shannon
    }

    pub fn eigenvalues(&self) -> ArrayView1<'_, f64> {
        self.decomposition.eigenvalues()
    }

    /// Rows are Slepian functions in ambient coefficients.
    pub fn functions(&self) -> ArrayView2<'_, T> {
        self.decomposition.eigenvectors()
    }

    pub fn decomposition(&self) -> &EigenDecomposition<T> {
        &self.decomposition
    }

    /// Number of Slepian functions available.
    pub fn rank(&self) -> usize {
        self.decomposition.rank()
    }

    /// Size of the ambient coefficient space.
    pub fn dimension(&self) -> usize {
        self.decomposition.dimension()
    }

    fn check_rank(&self, rank: usize) -> Result<()> {
        if rank >= self.rank() {
            return Err(SlepianError::config(
                "rank",
                format!(
                    "rank {rank} requested but only {} Slepian functions are available",
                    self.rank()
                ),
            ));
        }
        Ok(())
    }

    /// Ambient coefficients of Slepian function `rank`.
    pub fn function(&self, rank: usize) -> Result<ArrayView1<'_, T>> {
        self.check_rank(rank)?;
        Ok(self.decomposition.eigenvector_rows().row(rank))
    }

    /// Concentration ratio of Slepian function `rank`.
    pub fn eigenvalue(&self, rank: usize) -> Result<f64> {
        self.check_rank(rank)?;
        Ok(self.decomposition.eigenvalues()[rank])
    }

    /// `f_p = <f, S_p>` for every available `p`.
    pub fn forward(&self, flm: ArrayView1<'_, T>) -> Result<Array1<T>> {
        self.forward_truncated(flm, self.rank())
    }

    /// `f_p` for the first `n` Slepian functions.
    pub fn forward_truncated(&self, flm: ArrayView1<'_, T>, n: usize) -> Result<Array1<T>> {
        if flm.len() != self.dimension() {
            return Err(SlepianError::Dimension {
                what: "ambient coefficients",
                expected: self.dimension(),
                actual: flm.len(),
            });
        }
        if n > self.rank() {
            return Err(SlepianError::Dimension {
                what: "slepian rank",
                expected: self.rank(),
                actual: n,
            });
        }
        let rows = self.decomposition.eigenvectors();
        Ok(rows
            .slice(s![..n, ..])
            .rows()
            .into_iter()
            .map(|row| {
                row.iter()
                    .zip(flm.iter())
                    .fold(T::zero(), |acc, (s, f)| acc + *f * s.conjugate())
            })
            .collect())
    }

    /// `sum_p f_p S_p` over the supplied coefficients; missing ranks are zero.
    pub fn inverse(&self, coefficients: ArrayView1<'_, T>) -> Result<Array1<T>> {
        let k = coefficients.len();
        if k > self.rank() {
            return Err(SlepianError::Dimension {
                what: "slepian coefficients",
                expected: self.rank(),
                actual: k,
            });
        }
        let rows = self.decomposition.eigenvectors();
        Ok(coefficients.dot(&rows.slice(s![..k, ..])))
    }
}

#[cfg(test)]
mod __test__;
