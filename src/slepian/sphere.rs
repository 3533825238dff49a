use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1};
use rustfft::num_complex::Complex64;
use tracing::info;

use super::SlepianBasis;
use crate::concentration::{ConcentrationBuilder, DegreeRange, PolarCapKernel, SphereKernel};
use crate::config::SlepianConfig;
use crate::eigen::{solve_hermitian, CacheKey, EigenCache};
use crate::error::{Result, SlepianError};
use crate::harmonic::SignalTransform;
use crate::quadrature::{SphereIntegrator, SPHERE_AREA};
use crate::region::mask::{restrict_to_region, sphere_mask};
use crate::region::{MaskStore, Region};

/// `round(area * L^2 / 4 pi)`.
pub fn shannon_number(area: f64, bandlimit: usize) -> usize {
    (area * (bandlimit * bandlimit) as f64 / SPHERE_AREA).round() as usize
}

/// Slepian basis of a region on the sphere.
#[derive(Debug, Clone)]
pub struct SlepianSphere {
    region: Region,
    bandlimit: usize,
    area: f64,
    mask: Array2<f64>,
    basis: SlepianBasis<Complex64>,
}

impl SlepianSphere {
    /// Loads the decomposition from `cache` or computes it from scratch.
    pub fn compute<T: SignalTransform + ?Sized>(
        transform: &T,
        region: Region,
        config: &SlepianConfig,
        cache: &dyn EigenCache<Complex64>,
    ) -> Result<Self> {
        Self::compute_degrees(transform, region, config, cache, None)
    }

    /// Like [`compute`](Self::compute); a degree window smaller than the
    /// bandlimit stores a partial matrix and returns
    /// [`SlepianError::LargeJobSplit`]. Such a window is rejected when
    /// `save_matrices` is off.
    pub fn compute_degrees<T: SignalTransform + ?Sized>(
        transform: &T,
        region: Region,
        config: &SlepianConfig,
        cache: &dyn EigenCache<Complex64>,
        degrees: Option<DegreeRange>,
    ) -> Result<Self> {
        config.validate()?;
        let l = transform.bandlimit();
        let grid = transform.grid();
        let store = MaskStore::new(&config.mask_dir);
        let mask = sphere_mask(&region, grid, &store)?;
        let integrator = SphereIntegrator::new(grid, config.quadrature);

        let area = match &region {
            Region::PolarCap { theta_max, gap } => {
                let cap = 2.0 * PI * (1.0 - theta_max.cos());
                if *gap {
                    2.0 * cap
                } else {
                    cap
                }
            }
            _ => integrator.area(mask.view())?,
        };
        let shannon = shannon_number(area, l);
        info!(region = %region.name_suffix(), bandlimit = l, shannon, "Shannon number");

        let truncate = matches!(region, Region::Arbitrary { .. });
        let key = CacheKey::sphere(&region.name_suffix(), l, truncate.then_some(shannon));

        if config.save_matrices {
            if let Some(decomposition) = cache.load(&key)? {
                return Ok(Self {
                    region,
                    bandlimit: l,
                    area,
                    mask,
                    basis: SlepianBasis::new(decomposition, shannon),
                });
            }
        }

        let degrees = degrees.unwrap_or(DegreeRange::new(0, l));
        if !config.save_matrices && !degrees.covers(l) {
            return Err(SlepianError::config(
                "save_matrices",
                "a degree window needs save_matrices so the partial matrix is persisted",
            ));
        }
        let builder = ConcentrationBuilder::from_config(config);
        let matrix = match &region {
            Region::PolarCap { theta_max, gap } => {
                if *gap && *theta_max > PI / 2.0 {
                    return Err(SlepianError::config(
                        "theta_max",
                        "a polar gap needs theta_max of at most pi / 2",
                    ));
                }
                let kernel = PolarCapKernel::new(l, *theta_max, *gap)?;
                builder.build_degrees(&kernel, degrees, cache, &key)?
            }
            _ => {
                let kernel = SphereKernel::new(transform, &integrator, mask.view())?;
                builder.build_degrees(&kernel, degrees, cache, &key)?
            }
        };

        let mut decomposition = solve_hermitian(&matrix)?;
        if truncate {
            decomposition = decomposition.truncated(shannon);
        }
        if config.save_matrices {
            cache.store(&key, &decomposition)?;
        }
        Ok(Self {
            region,
            bandlimit: l,
            area,
            mask,
            basis: SlepianBasis::new(decomposition, shannon),
        })
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    pub fn bandlimit(&self) -> usize {
        self.bandlimit
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn shannon_number(&self) -> usize {
        self.basis.shannon_number()
    }

    /// Region indicator on the transform's grid.
    pub fn mask(&self) -> &Array2<f64> {
        &self.mask
    }

    pub fn basis(&self) -> &SlepianBasis<Complex64> {
        &self.basis
    }

    pub fn forward(&self, flm: ArrayView1<'_, Complex64>) -> Result<Array1<Complex64>> {
        self.basis.forward(flm)
    }

    pub fn inverse(&self, coefficients: ArrayView1<'_, Complex64>) -> Result<Array1<Complex64>> {
        self.basis.inverse(coefficients)
    }

    /// Slepian coefficients of `flm` after zeroing it outside the region.
    pub fn forward_in_region<T: SignalTransform + ?Sized>(
        &self,
        transform: &T,
        flm: ArrayView1<'_, Complex64>,
    ) -> Result<Array1<Complex64>> {
        let masked = restrict_to_region(transform, flm, self.mask.view())?;
        self.basis.forward(masked.view())
    }
}
