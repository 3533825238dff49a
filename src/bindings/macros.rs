// src/bindings/macros.rs

/// Generates a `#[pyfunction]` wrapper around a crate function.
///
/// Usage:
/// `create_binding!(python_name, rust_fn_path, [arg1, arg2, ...], return_kind);`
///
/// Every argument is a `usize`. Return kinds:
/// - `PyArray2`: fallible `Array2<f64>`
/// - `ranges`: `Vec<Range<usize>>` as a list of `(start, end)` tuples
/// - `scalar`: fallible `usize`
///
/// Example:
/// `create_binding!(create_kappas, crate::wavelet::create_kappas, [xlim, b, j_min], PyArray2);`
#[macro_export]
macro_rules! create_binding {
    // (usize, ..) -> Result<Array2<f64>>
    ($py_fn_name:ident, $rust_fn:path, [$($arg:ident),+], PyArray2) => {
        #[pyo3::prelude::pyfunction]
        fn $py_fn_name<'py>(
            py: pyo3::prelude::Python<'py>,
            $($arg: usize),+
        ) -> pyo3::prelude::PyResult<&'py numpy::PyArray2<f64>> {
            let result = $rust_fn($($arg),+)?;
            Ok(numpy::IntoPyArray::into_pyarray(result, py))
        }
    };

    // (usize, ..) -> Vec<Range<usize>>
    ($py_fn_name:ident, $rust_fn:path, [$($arg:ident),+], ranges) => {
        #[pyo3::prelude::pyfunction]
        fn $py_fn_name($($arg: usize),+) -> Vec<(usize, usize)> {
            $rust_fn($($arg),+)
                .into_iter()
                .map(|range| (range.start, range.end))
                .collect()
        }
    };

    // (usize, ..) -> Result<usize>
    ($py_fn_name:ident, $rust_fn:path, [$($arg:ident),+], scalar) => {
        #[pyo3::prelude::pyfunction]
        fn $py_fn_name($($arg: usize),+) -> pyo3::prelude::PyResult<usize> {
            Ok($rust_fn($($arg),+)?)
        }
    };
}
