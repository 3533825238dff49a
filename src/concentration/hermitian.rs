use ndarray::Array2;

use super::Coefficient;

/// Assigns `a[i][j] = conj(a[j][i])` for every `j > i`.
pub fn fill_upper_triangle<T: Coefficient>(a: &mut Array2<T>) {
    let n = a.nrows().min(a.ncols());
    for i in 0..n {
        for j in (i + 1)..n {
            a[[i, j]] = a[[j, i]].conjugate();
        }
    }
}

/// Exact equality of `a` and its conjugate transpose.
pub fn is_hermitian<T: Coefficient>(a: &Array2<T>) -> bool {
    if a.nrows() != a.ncols() {
        return false;
    }
    let n = a.nrows();
    (0..n).all(|i| (0..n).all(|j| a[[i, j]] == a[[j, i]].conjugate()))
}
