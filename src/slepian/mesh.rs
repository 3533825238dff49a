use ndarray::{Array1, ArrayView1};
use tracing::{info, warn};

use super::SlepianBasis;
use crate::concentration::{ConcentrationBuilder, MeshDomain, MeshKernel};
use crate::config::SlepianConfig;
use crate::eigen::{solve_hermitian, CacheKey, EigenCache};
use crate::error::Result;

/// Slepian basis of a region on a mesh. Only the leading Shannon-number
/// functions are kept.
#[derive(Debug, Clone)]
pub struct SlepianMesh {
    basis: SlepianBasis<f64>,
}

impl SlepianMesh {
    pub fn compute(
        domain: &MeshDomain,
        config: &SlepianConfig,
        cache: &dyn EigenCache<f64>,
    ) -> Result<Self> {
        config.validate()?;
        let shannon = domain.shannon_number();
        info!(mesh = domain.name(), n_basis = domain.n_basis(), shannon, "computing slepian functions of mesh");
        let key = CacheKey::mesh(domain.name(), domain.n_basis(), shannon);

        if config.save_matrices {
            if let Some(decomposition) = cache.load(&key)? {
                return Ok(Self {
                    basis: SlepianBasis::new(decomposition, shannon),
                });
            }
        }

        let kernel = MeshKernel::new(domain);
        let matrix = ConcentrationBuilder::from_config(config).build(&kernel)?;
        let trace = matrix.diag().sum();
        let difference = (shannon as f64 - trace).abs();
        info!(
            shannon,
            trace = trace.round(),
            difference = difference.round(),
            "Shannon number from vertices vs trace of D matrix"
        );
        if difference > 0.5 * shannon.max(1) as f64 {
            warn!(shannon, trace, "trace of D matrix far from Shannon number, is the basis orthonormal?");
        }

        let decomposition = solve_hermitian(&matrix)?.truncated(shannon);
        if config.save_matrices {
            cache.store(&key, &decomposition)?;
        }
        Ok(Self {
            basis: SlepianBasis::new(decomposition, shannon),
        })
    }

    pub fn basis(&self) -> &SlepianBasis<f64> {
        &self.basis
    }

    pub fn shannon_number(&self) -> usize {
        self.basis.shannon_number()
    }

    /// Slepian coefficients from mesh basis coefficients.
    pub fn forward(&self, coefficients: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        self.basis.forward(coefficients)
    }

    pub fn inverse(&self, coefficients: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        self.basis.inverse(coefficients)
    }
}
