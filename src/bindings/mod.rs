#[macro_use]
mod macros;

mod slepian;
mod wavelet;

pub use slepian::*;

use pyo3::exceptions::{PyFileNotFoundError, PyIOError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyModule;

use crate::error::SlepianError;

impl From<SlepianError> for PyErr {
    fn from(err: SlepianError) -> Self {
        match err {
            SlepianError::Configuration { .. } | SlepianError::Dimension { .. } => {
                PyValueError::new_err(err.to_string())
            }
            SlepianError::MissingAsset(_) => PyFileNotFoundError::new_err(err.to_string()),
            SlepianError::Io(_) => PyIOError::new_err(err.to_string()),
            _ => PyRuntimeError::new_err(err.to_string()),
        }
    }
}

/// Configure log output; see [`crate::logging::init`].
#[pyfunction]
#[pyo3(signature = (verbosity=1))]
fn init_logging(verbosity: u8) {
    crate::logging::init(verbosity);
}

/// Slepian concentration, wavelets and denoising.
#[pymodule]
pub fn _rust(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_function(wrap_pyfunction!(init_logging, m)?)?;
    // Wavelet tiling, chunking and denoising
    wavelet::register(m)?;
    // Polar-cap Slepian bases
    m.add_class::<PySlepianPolarCap>()?;
    Ok(())
}
