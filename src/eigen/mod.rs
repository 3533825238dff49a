//! Dense Hermitian eigensolver and the ordering conventions of the basis.

pub mod cache;

pub use cache::{CacheKey, EigenCache, InMemoryCache, NoCache, NpyDiskCache};

use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2};
use nalgebra::{DMatrix, SymmetricEigen};
use tracing::debug;

use crate::concentration::Coefficient;
use crate::error::{Result, SlepianError};

/// Eigenvalues in descending order and the matching eigenvectors as rows.
///
/// Row `p` holds the ambient coefficients of Slepian function `p`. When only
/// the leading rows were kept, `eigenvectors.nrows() < eigenvalues.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenDecomposition<T> {
    eigenvalues: Array1<f64>,
    eigenvectors: Array2<T>,
}

impl<T: Coefficient> EigenDecomposition<T> {
    pub fn new(eigenvalues: Array1<f64>, eigenvectors: Array2<T>) -> Result<Self> {
        if eigenvectors.nrows() > eigenvalues.len() {
            return Err(SlepianError::Dimension {
                what: "eigenvector rows",
                expected: eigenvalues.len(),
                actual: eigenvectors.nrows(),
            });
        }
        Ok(Self {
            eigenvalues,
            eigenvectors,
        })
    }

    pub fn eigenvalues(&self) -> ArrayView1<'_, f64> {
        self.eigenvalues.view()
    }

    pub fn eigenvectors(&self) -> ArrayView2<'_, T> {
        self.eigenvectors.view()
    }

    pub(crate) fn eigenvector_rows(&self) -> &Array2<T> {
        &self.eigenvectors
    }

    /// Number of stored eigenvector rows.
    pub fn rank(&self) -> usize {
        self.eigenvectors.nrows()
    }

    /// Length of each eigenvector.
    pub fn dimension(&self) -> usize {
        self.eigenvectors.ncols()
    }

    /// Keeps every eigenvalue but only the first `rows` eigenvectors.
    pub fn truncated(&self, rows: usize) -> Self {
        let rows = rows.min(self.rank());
        Self {
            eigenvalues: self.eigenvalues.clone(),
            eigenvectors: self.eigenvectors.slice(s![..rows, ..]).to_owned(),
        }
    }

    pub fn into_parts(self) -> (Array1<f64>, Array2<T>) {
        (self.eigenvalues, self.eigenvectors)
    }
}

/// Eigendecomposition of a Hermitian matrix.
///
/// Eigenvalues are sorted descending. Eigenvector `p` is conjugated and
/// stored as row `p`; rows whose first entry has a negative real part are
/// negated.
pub fn solve_hermitian<T: Coefficient>(matrix: &Array2<T>) -> Result<EigenDecomposition<T>> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(SlepianError::Dimension {
            what: "concentration matrix columns",
            expected: rows,
            actual: cols,
        });
    }
    let n = rows;
    debug!(size = n, "solving eigenproblem");
    let dense = DMatrix::from_fn(n, n, |r, c| matrix[[r, c]]);
    let eig = SymmetricEigen::new(dense);

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[b].total_cmp(&eig.eigenvalues[a]));

    let eigenvalues = Array1::from_shape_fn(n, |p| eig.eigenvalues[order[p]]);
    let mut eigenvectors =
        Array2::from_shape_fn((n, n), |(p, k)| eig.eigenvectors[(k, order[p])].conjugate());
    for mut row in eigenvectors.rows_mut() {
        if row[0].real() < 0.0 {
            row.mapv_inplace(|v| -v);
        }
    }
    EigenDecomposition::new(eigenvalues, eigenvectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rustfft::num_complex::Complex64;

    #[test]
    fn real_symmetric_sorted_descending() {
        let m = array![[2.0, 1.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 0.5]];
        let eig = solve_hermitian(&m).unwrap();
        assert_relative_eq!(eig.eigenvalues()[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(eig.eigenvalues()[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(eig.eigenvalues()[2], 0.5, epsilon = 1e-12);
        // leading vector (1, 1)/sqrt2 with positive first entry
        let v = eig.eigenvectors();
        assert_relative_eq!(v[[0, 0]], 0.5f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(v[[0, 1]], 0.5f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn complex_rows_are_conjugated_eigenvectors() {
        let i = Complex64::new(0.0, 1.0);
        let one = Complex64::new(1.0, 0.0);
        let m = array![[one * 2.0, i], [-i, one * 2.0]];
        let eig = solve_hermitian(&m).unwrap();
        assert_relative_eq!(eig.eigenvalues()[0], 3.0, epsilon = 1e-12);
        for p in 0..2 {
            let row = eig.eigenvectors().row(p).to_owned();
            let v = row.mapv(|x| x.conj());
            let mv = m.dot(&v);
            for k in 0..2 {
                let expected = v[k] * eig.eigenvalues()[p];
                assert_relative_eq!(mv[k].re, expected.re, epsilon = 1e-10);
                assert_relative_eq!(mv[k].im, expected.im, epsilon = 1e-10);
            }
            assert!(row[0].re >= 0.0);
        }
    }

    #[test]
    fn truncation_keeps_eigenvalues() {
        let m = Array2::from_diag(&array![1.0, 0.25, 0.75]);
        let eig = solve_hermitian(&m).unwrap().truncated(2);
        assert_eq!(eig.rank(), 2);
        assert_eq!(eig.eigenvalues().len(), 3);
        assert_eq!(eig.dimension(), 3);
    }

    #[test]
    fn more_rows_than_eigenvalues_rejected() {
        let err = EigenDecomposition::new(array![1.0], Array2::<f64>::zeros((2, 2)));
        assert!(err.is_err());
    }

    #[test]
    fn non_square_rejected() {
        assert!(solve_hermitian(&Array2::<f64>::zeros((2, 3))).is_err());
    }
}
