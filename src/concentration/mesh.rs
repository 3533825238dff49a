use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, Zip};
use tracing::info;

use super::ConcentrationKernel;
use crate::error::{Result, SlepianError};
use crate::quadrature::MeshIntegrator;
use crate::region::MeshBox;

/// A discretised manifold: vertex positions, a basis sampled on the
/// vertices, per-vertex mass weights and a region of interest.
#[derive(Debug, Clone)]
pub struct MeshDomain {
    name: String,
    vertices: Array2<f64>,
    /// `(n_basis, n_vertices)`, one basis function per row.
    basis: Array2<f64>,
    integrator: MeshIntegrator,
    region: Array1<bool>,
}

impl MeshDomain {
    /// `mass` defaults to unit weights.
    pub fn new(
        name: impl Into<String>,
        vertices: Array2<f64>,
        basis: Array2<f64>,
        mass: Option<Array1<f64>>,
        region: &MeshBox,
    ) -> Result<Self> {
        let mask = region.mask(vertices.view())?;
        Self::with_region_mask(name, vertices, basis, mass, mask)
    }

    pub fn with_region_mask(
        name: impl Into<String>,
        vertices: Array2<f64>,
        basis: Array2<f64>,
        mass: Option<Array1<f64>>,
        region: Array1<bool>,
    ) -> Result<Self> {
        let n_vertices = vertices.nrows();
        if basis.ncols() != n_vertices {
            return Err(SlepianError::Dimension {
                what: "mesh basis samples",
                expected: n_vertices,
                actual: basis.ncols(),
            });
        }
        if region.len() != n_vertices {
            return Err(SlepianError::Dimension {
                what: "mesh region",
                expected: n_vertices,
                actual: region.len(),
            });
        }
        let integrator = match mass {
            Some(mass) if mass.len() != n_vertices => {
                return Err(SlepianError::Dimension {
                    what: "mesh mass weights",
                    expected: n_vertices,
                    actual: mass.len(),
                })
            }
            Some(mass) => MeshIntegrator::new(mass),
            None => MeshIntegrator::uniform(n_vertices),
        };
        Ok(Self {
            name: name.into(),
            vertices,
            basis,
            integrator,
            region,
        })
    }

    /// Rescales every basis function to unit norm under the mass weights.
    pub fn orthonormalise(mut self) -> Result<Self> {
        info!(mesh = %self.name, "orthonormalising basis functions");
        let mass = self.integrator.mass();
        for (i, mut phi) in self.basis.axis_iter_mut(Axis(0)).enumerate() {
            let norm = Zip::from(&phi)
                .and(mass)
                .fold(0.0, |acc, &p, &w| acc + w * p * p)
                .sqrt();
            if norm == 0.0 {
                return Err(SlepianError::config(
                    "basis",
                    format!("basis function {i} vanishes on the mesh"),
                ));
            }
            phi /= norm;
        }
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &Array2<f64> {
        &self.vertices
    }

    pub fn basis(&self) -> &Array2<f64> {
        &self.basis
    }

    pub fn region(&self) -> &Array1<bool> {
        &self.region
    }

    pub fn integrator(&self) -> &MeshIntegrator {
        &self.integrator
    }

    pub fn n_basis(&self) -> usize {
        self.basis.nrows()
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.nrows()
    }

    /// `round(n_basis * region mass / total mass)`.
    pub fn shannon_number(&self) -> usize {
        let mass = self.integrator.mass();
        let total = mass.sum();
        if total <= 0.0 {
            return 0;
        }
        let inside = Zip::from(mass)
            .and(&self.region)
            .fold(0.0, |acc, &w, &r| if r { acc + w } else { acc });
        (self.n_basis() as f64 * inside / total).round() as usize
    }

    /// Coefficients `u_i = sum(mass * f * phi_i)`.
    pub fn forward(&self, field: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        if field.len() != self.n_vertices() {
            return Err(SlepianError::Dimension {
                what: "mesh field",
                expected: self.n_vertices(),
                actual: field.len(),
            });
        }
        let weighted = &field * self.integrator.mass();
        Ok(self.basis.dot(&weighted))
    }

    /// `sum_i u_i phi_i` over the supplied leading coefficients.
    pub fn inverse(&self, coefficients: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let k = coefficients.len();
        if k > self.n_basis() {
            return Err(SlepianError::Dimension {
                what: "mesh coefficients",
                expected: self.n_basis(),
                actual: k,
            });
        }
        Ok(coefficients.dot(&self.basis.slice(ndarray::s![..k, ..])))
    }

    /// Zeroes the synthesised field outside the region and projects back.
    pub fn restrict_to_region(&self, coefficients: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let mut field = self.inverse(coefficients)?;
        field.zip_mut_with(&self.region, |f, &inside| {
            if !inside {
                *f = 0.0;
            }
        });
        self.forward(field.view())
    }
}

/// Row kernel of the real symmetric mesh concentration matrix.
pub struct MeshKernel<'a> {
    basis: ArrayView2<'a, f64>,
    weight: Array1<f64>,
}

impl<'a> MeshKernel<'a> {
    pub fn new(domain: &'a MeshDomain) -> Self {
        let weight = Zip::from(domain.integrator().mass())
            .and(domain.region())
            .map_collect(|&w, &inside| if inside { w } else { 0.0 });
        Self {
            basis: domain.basis().view(),
            weight,
        }
    }

    pub fn integral(&self, i: usize, j: usize) -> f64 {
        Zip::from(&self.weight)
            .and(self.basis.row(i))
            .and(self.basis.row(j))
            .fold(0.0, |acc, &w, &a, &b| acc + w * a * b)
    }
}

impl ConcentrationKernel for MeshKernel<'_> {
    type Elem = f64;

    fn size(&self) -> usize {
        self.basis.nrows()
    }

    fn fill_row(&self, row: usize, out: &mut [f64]) -> Result<()> {
        for (col, slot) in out.iter_mut().enumerate().take(row + 1) {
            *slot = self.integral(row, col);
        }
        Ok(())
    }
}
