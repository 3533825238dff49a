//! Concentration matrix assembly.
//!
//! `D[i][j] = int_R basis_i conj(basis_j)` is filled one row at a time by a
//! [`ConcentrationKernel`]; [`ConcentrationBuilder`] spreads rows over a
//! worker pool, completes the Hermitian upper triangle and handles
//! sub-range jobs.

pub mod hermitian;
pub mod mesh;
pub mod parallel;
pub mod polar;
pub mod sphere;

pub use hermitian::{fill_upper_triangle, is_hermitian};
pub use mesh::{MeshDomain, MeshKernel};
pub use parallel::{fill_rows, split_into_chunks};
pub use polar::PolarCapKernel;
pub use sphere::SphereKernel;

use std::ops::Range;

use ndarray::{Array2, LinalgScalar, ScalarOperand};
use ndarray_npy::{ReadableElement, WritableElement};
use num_traits::Zero;
use simba::scalar::ComplexField;
use tracing::info;

use crate::config::SlepianConfig;
use crate::eigen::cache::{CacheKey, EigenCache};
use crate::error::{Result, SlepianError};

/// Scalar of a concentration matrix: `f64` on meshes, `Complex64` on the
/// sphere.
pub trait Coefficient:
    ComplexField<RealField = f64>
    + Copy
    + Zero
    + LinalgScalar
    + ScalarOperand
    + ReadableElement
    + WritableElement
    + Send
    + Sync
    + 'static
{
}

impl<T> Coefficient for T where
    T: ComplexField<RealField = f64>
        + Copy
        + Zero
        + LinalgScalar
        + ScalarOperand
        + ReadableElement
        + WritableElement
        + Send
        + Sync
        + 'static
{
}

/// Computes the lower-triangular part of one matrix row.
pub trait ConcentrationKernel: Sync {
    type Elem: Coefficient;

    /// Matrix dimension.
    fn size(&self) -> usize;

    /// Writes `D[row][0..=row]` into `out`, a full row of length `size()`.
    /// Entries right of the diagonal are left untouched.
    fn fill_row(&self, row: usize, out: &mut [Self::Elem]) -> Result<()>;
}

/// Degree window of a split sphere job: rows `ell_min^2 .. ell_max^2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeRange {
    pub ell_min: usize,
    pub ell_max: usize,
}

impl DegreeRange {
    pub fn new(ell_min: usize, ell_max: usize) -> Self {
        Self { ell_min, ell_max }
    }

    pub fn rows(&self) -> Range<usize> {
        self.ell_min * self.ell_min..self.ell_max * self.ell_max
    }

    /// Whether the window spans every degree below `bandlimit`.
    pub fn covers(&self, bandlimit: usize) -> bool {
        self.ell_min == 0 && self.ell_max == bandlimit
    }

    /// Label of the persisted partial matrix.
    pub fn label(&self) -> String {
        format!("D_min{}_max{}", self.ell_min, self.ell_max)
    }

    fn validate(&self, bandlimit: usize) -> Result<()> {
        if self.ell_max > bandlimit {
            return Err(SlepianError::config(
                "ell_max",
                format!("cannot be greater than L: {bandlimit}"),
            ));
        }
        if self.ell_min >= self.ell_max {
            return Err(SlepianError::config("ell_min", "must be below ell_max"));
        }
        Ok(())
    }
}

/// Drives a kernel through the parallel fill.
#[derive(Debug, Clone)]
pub struct ConcentrationBuilder {
    workers: usize,
}

impl ConcentrationBuilder {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn from_config(config: &SlepianConfig) -> Self {
        Self::new(config.workers)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Full Hermitian matrix.
    pub fn build<K: ConcentrationKernel>(&self, kernel: &K) -> Result<Array2<K::Elem>> {
        let n = kernel.size();
        info!(size = n, workers = self.workers, "assembling concentration matrix");
        let mut matrix = fill_rows(kernel, 0..n, self.workers)?;
        fill_upper_triangle(&mut matrix);
        Ok(matrix)
    }

    /// Like [`build`](Self::build) but restricted to a degree window of a
    /// sphere problem with bandlimit `sqrt(size)`.
    ///
    /// A window smaller than the full problem persists its rows through
    /// `cache.store_partial` and returns [`SlepianError::LargeJobSplit`].
    /// The cache must persist for the split to be resumable; a
    /// [`NoCache`](crate::eigen::NoCache) drops the rows.
    pub fn build_degrees<K: ConcentrationKernel>(
        &self,
        kernel: &K,
        degrees: DegreeRange,
        cache: &dyn EigenCache<K::Elem>,
        key: &CacheKey,
    ) -> Result<Array2<K::Elem>> {
        let n = kernel.size();
        let bandlimit = (n as f64).sqrt().round() as usize;
        degrees.validate(bandlimit)?;
        if degrees.covers(bandlimit) {
            return self.build(kernel);
        }
        let rows = degrees.rows();
        let matrix = fill_rows(kernel, rows.clone(), self.workers)?;
        let label = degrees.label();
        info!(%label, "large job has been used, saving intermediate matrix");
        cache.store_partial(key, &label, &matrix)?;
        Err(SlepianError::LargeJobSplit {
            rows,
            total: n,
            label,
        })
    }
}

#[cfg(test)]
mod __test__;
