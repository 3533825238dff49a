use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use ndarray_npy::read_npy;
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::Region;
use crate::error::{Result, SlepianError};
use crate::harmonic::{SamplingGrid, SignalTransform};

/// Directory of precomputed arbitrary-region masks, one `.npy` per
/// `(name, resolution)` pair.
#[derive(Debug, Clone)]
pub struct MaskStore {
    dir: PathBuf,
}

impl MaskStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, mask_name: &str, resolution: usize) -> PathBuf {
        self.dir.join(format!("{mask_name}_L{resolution}.npy"))
    }

    /// Reads a mask saved either as booleans or as floats.
    pub fn load(&self, mask_name: &str, resolution: usize) -> Result<Array2<f64>> {
        let path = self.path_for(mask_name, resolution);
        if !path.exists() {
            error!(path = %path.display(), "can not find mask file");
            return Err(SlepianError::MissingAsset(path));
        }
        match read_npy::<_, Array2<f64>>(&path) {
            Ok(mask) => Ok(mask),
            Err(_) => {
                let mask: Array2<bool> = read_npy(&path)?;
                Ok(mask.mapv(|inside| if inside { 1.0 } else { 0.0 }))
            }
        }
    }
}

/// Indicator of `region` on `grid` as `0.0`/`1.0` samples.
pub fn sphere_mask(region: &Region, grid: &SamplingGrid, store: &MaskStore) -> Result<Array2<f64>> {
    let indicator = |inside: bool| if inside { 1.0 } else { 0.0 };
    let mask = match region {
        Region::PolarCap { theta_max, gap } => {
            info!("creating polar cap mask");
            let (theta_max, gap) = (*theta_max, *gap);
            grid.map(|theta, _| {
                indicator(theta <= theta_max || (gap && theta >= std::f64::consts::PI - theta_max))
            })
        }
        Region::LimitedLatLon {
            theta_min,
            theta_max,
            phi_min,
            phi_max,
        } => {
            info!("creating limited latitude longitude mask");
            grid.map(|theta, phi| {
                indicator(
                    theta >= *theta_min
                        && theta <= *theta_max
                        && phi >= *phi_min
                        && phi <= *phi_max,
                )
            })
        }
        Region::Arbitrary { mask_name } => {
            info!(mask = %mask_name, "loading and checking shape of provided mask");
            let resolution = grid.shape().0;
            let mask = store.load(mask_name, resolution)?;
            if mask.dim() != grid.shape() {
                return Err(SlepianError::config(
                    "mask_name",
                    format!(
                        "mask {mask_name} has shape {:?} which does not match the grid {:?}",
                        mask.dim(),
                        grid.shape()
                    ),
                ));
            }
            mask
        }
    };
    Ok(mask)
}

/// Zeroes `flm` outside the region and transforms back, keeping the result
/// band-limited.
pub fn restrict_to_region<T: SignalTransform + ?Sized>(
    transform: &T,
    flm: ArrayView1<'_, Complex64>,
    mask: ArrayView2<'_, f64>,
) -> Result<Array1<Complex64>> {
    let mut field = transform.inverse(flm)?;
    if field.dim() != mask.dim() {
        return Err(SlepianError::config(
            "mask",
            format!(
                "mask shape {:?} does not match grid {:?}",
                mask.dim(),
                field.dim()
            ),
        ));
    }
    field.zip_mut_with(&mask, |f, &m| *f *= m);
    transform.forward(field.view())
}

/// Axis-aligned box on mesh vertex coordinates, inclusive on every bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshBox {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
    pub z_min: f64,
    pub z_max: f64,
}

impl Default for MeshBox {
    fn default() -> Self {
        Self {
            x_min: f64::NEG_INFINITY,
            x_max: f64::INFINITY,
            y_min: f64::NEG_INFINITY,
            y_max: f64::INFINITY,
            z_min: f64::NEG_INFINITY,
            z_max: f64::INFINITY,
        }
    }
}

impl MeshBox {
    /// Vertices `(n, 3)` inside the box.
    pub fn mask(&self, vertices: ArrayView2<'_, f64>) -> Result<Array1<bool>> {
        if vertices.ncols() != 3 {
            return Err(SlepianError::Dimension {
                what: "mesh vertex coordinates",
                expected: 3,
                actual: vertices.ncols(),
            });
        }
        Ok(vertices
            .axis_iter(Axis(0))
            .map(|v| {
                v[0] >= self.x_min
                    && v[0] <= self.x_max
                    && v[1] >= self.y_min
                    && v[1] <= self.y_max
                    && v[2] >= self.z_min
                    && v[2] <= self.z_max
            })
            .collect())
    }
}
