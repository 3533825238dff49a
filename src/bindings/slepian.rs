//! # Python class for polar-cap Slepian bases
//!
//! Wraps [`SlepianSphere`] on the reference equiangular transform.

use std::path::PathBuf;

use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::prelude::*;
use rustfft::num_complex::Complex64;

use crate::config::SlepianConfig;
use crate::eigen::{NoCache, NpyDiskCache};
use crate::harmonic::EquiangularTransform;
use crate::region::Region;
use crate::slepian::SlepianSphere;

#[pyclass(name = "SlepianPolarCap", module = "slepian._rust")]
pub struct PySlepianPolarCap {
    inner: SlepianSphere,
}

#[pymethods]
impl PySlepianPolarCap {
    /// `theta_max` in degrees; with `data_dir` the eigensolution is cached
    /// there as `.npy` files.
    #[new]
    #[pyo3(signature = (bandlimit, theta_max, gap=false, workers=None, data_dir=None))]
    fn new(
        bandlimit: usize,
        theta_max: f64,
        gap: bool,
        workers: Option<usize>,
        data_dir: Option<PathBuf>,
    ) -> PyResult<Self> {
        let mut config = SlepianConfig::default();
        if let Some(workers) = workers {
            config = config.with_workers(workers);
        }
        let transform = EquiangularTransform::new(bandlimit, config.resolution(bandlimit))?;
        let region = Region::polar_cap(theta_max.to_radians(), gap)?;
        let inner = match data_dir {
            Some(dir) => {
                let cache = NpyDiskCache::new(&dir);
                SlepianSphere::compute(&transform, region, &config.with_data_dir(dir), &cache)?
            }
            None => {
                let config = config.with_save_matrices(false);
                SlepianSphere::compute(&transform, region, &config, &NoCache)?
            }
        };
        Ok(Self { inner })
    }

    #[getter]
    fn shannon_number(&self) -> usize {
        self.inner.shannon_number()
    }

    #[getter]
    fn bandlimit(&self) -> usize {
        self.inner.bandlimit()
    }

    fn eigenvalues<'py>(&self, py: Python<'py>) -> &'py PyArray1<f64> {
        self.inner.basis().eigenvalues().to_owned().into_pyarray(py)
    }

    fn eigenvectors<'py>(&self, py: Python<'py>) -> &'py PyArray2<Complex64> {
        self.inner.basis().functions().to_owned().into_pyarray(py)
    }

    fn forward<'py>(
        &self,
        py: Python<'py>,
        flm: PyReadonlyArray1<Complex64>,
    ) -> PyResult<&'py PyArray1<Complex64>> {
        Ok(self.inner.forward(flm.as_array())?.into_pyarray(py))
    }

    fn inverse<'py>(
        &self,
        py: Python<'py>,
        f_p: PyReadonlyArray1<Complex64>,
    ) -> PyResult<&'py PyArray1<Complex64>> {
        Ok(self.inner.inverse(f_p.as_array())?.into_pyarray(py))
    }

    fn __repr__(&self) -> String {
        format!(
            "SlepianPolarCap(region={}, L={}, N={})",
            self.inner.region().name_suffix(),
            self.inner.bandlimit(),
            self.inner.shannon_number()
        )
    }
}
