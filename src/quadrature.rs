//! Region-restricted integration on the sphere grid and on mesh vertices.

use std::f64::consts::PI;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use rustfft::num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlepianError};
use crate::harmonic::SamplingGrid;

/// Colatitude weighting of the sphere quadrature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuadratureRule {
    /// `sin(theta) * d_theta * d_phi`: the plain area element. Not exact
    /// for band-limited products, so concentration eigenvalues can exceed 1.
    Riemann,
    /// Fejér first-rule weights on the ring midpoints. Exact for products of
    /// band-limited functions when the grid has at least `2L - 1` rings.
    Fejer,
}

/// Weights `w_t` such that `sum_t w_t g(theta_t) ~ int_0^pi g(theta) sin(theta) dtheta`.
pub fn colatitude_weights(rule: QuadratureRule, grid: &SamplingGrid) -> Array1<f64> {
    let n = grid.thetas().len();
    match rule {
        QuadratureRule::Riemann => grid.thetas().mapv(|theta| theta.sin() * grid.delta_theta()),
        QuadratureRule::Fejer => grid.thetas().mapv(|theta| {
            let tail: f64 = (1..=n / 2)
                .map(|j| {
                    let jf = j as f64;
                    (2.0 * jf * theta).cos() / (4.0 * jf * jf - 1.0)
                })
                .sum();
            2.0 / n as f64 * (1.0 - 2.0 * tail)
        }),
    }
}

fn multiply_fields(fields: &[ArrayView2<'_, Complex64>], shape: (usize, usize)) -> Result<Array2<Complex64>> {
    let mut product = Array2::from_elem(shape, Complex64::new(1.0, 0.0));
    for field in fields {
        if field.dim() != shape {
            return Err(SlepianError::config(
                "field",
                format!("field shape {:?} does not match grid {:?}", field.dim(), shape),
            ));
        }
        product *= field;
    }
    Ok(product)
}

/// Sphere quadrature with a per-sample weight computed once from the grid.
#[derive(Debug, Clone)]
pub struct SphereIntegrator {
    weight: Array2<f64>,
}

impl SphereIntegrator {
    pub fn new(grid: &SamplingGrid, rule: QuadratureRule) -> Self {
        let ring = colatitude_weights(rule, grid);
        let d_phi = grid.delta_phi();
        let weight = Array2::from_shape_fn(grid.shape(), |(t, _)| ring[t] * d_phi);
        Self { weight }
    }

    pub fn weight(&self) -> &Array2<f64> {
        &self.weight
    }

    /// `sum(weight * prod(fields))` over the whole sphere.
    pub fn integrate_whole(&self, fields: &[ArrayView2<'_, Complex64>]) -> Result<Complex64> {
        let product = multiply_fields(fields, self.weight.dim())?;
        Ok(Zip::from(&product)
            .and(&self.weight)
            .fold(Complex64::new(0.0, 0.0), |acc, &f, &w| acc + f * w))
    }

    /// `sum(weight * mask * prod(fields))`.
    pub fn integrate_region(
        &self,
        mask: ArrayView2<'_, f64>,
        fields: &[ArrayView2<'_, Complex64>],
    ) -> Result<Complex64> {
        self.check_mask(mask)?;
        let product = multiply_fields(fields, self.weight.dim())?;
        Ok(Zip::from(&product)
            .and(&self.weight)
            .and(&mask)
            .fold(Complex64::new(0.0, 0.0), |acc, &f, &w, &m| acc + f * (w * m)))
    }

    /// Area of the masked region.
    pub fn area(&self, mask: ArrayView2<'_, f64>) -> Result<f64> {
        self.check_mask(mask)?;
        Ok(Zip::from(&self.weight).and(&mask).fold(0.0, |acc, &w, &m| acc + w * m))
    }

    /// `weight * mask`, precomputed once per concentration pass.
    pub fn region_weight(&self, mask: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
        self.check_mask(mask)?;
        Ok(&self.weight * &mask)
    }

    fn check_mask(&self, mask: ArrayView2<'_, f64>) -> Result<()> {
        if mask.dim() != self.weight.dim() {
            return Err(SlepianError::config(
                "mask",
                format!(
                    "mask shape {:?} does not match grid {:?}",
                    mask.dim(),
                    self.weight.dim()
                ),
            ));
        }
        Ok(())
    }
}

/// `sum(region_weight * f * conj(g))`, the hot loop of the sphere matrix fill.
pub fn weighted_inner_product(
    region_weight: ArrayView2<'_, f64>,
    f: ArrayView2<'_, Complex64>,
    g: ArrayView2<'_, Complex64>,
) -> Complex64 {
    Zip::from(&region_weight)
        .and(&f)
        .and(&g)
        .fold(Complex64::new(0.0, 0.0), |acc, &w, &a, &b| {
            acc + a * b.conj() * w
        })
}

/// Mesh quadrature: per-vertex mass weights fixed at construction.
#[derive(Debug, Clone)]
pub struct MeshIntegrator {
    mass: Array1<f64>,
}

impl MeshIntegrator {
    pub fn new(mass: Array1<f64>) -> Self {
        Self { mass }
    }

    /// Unit mass on every vertex.
    pub fn uniform(vertices: usize) -> Self {
        Self::new(Array1::ones(vertices))
    }

    pub fn mass(&self) -> &Array1<f64> {
        &self.mass
    }

    pub fn integrate_whole(&self, fields: &[ArrayView1<'_, f64>]) -> Result<f64> {
        let product = self.multiply(fields)?;
        Ok(product.dot(&self.mass))
    }

    pub fn integrate_region(
        &self,
        mask: ArrayView1<'_, bool>,
        fields: &[ArrayView1<'_, f64>],
    ) -> Result<f64> {
        if mask.len() != self.mass.len() {
            return Err(SlepianError::config(
                "region",
                format!(
                    "region has {} vertices, mesh has {}",
                    mask.len(),
                    self.mass.len()
                ),
            ));
        }
        let product = self.multiply(fields)?;
        Ok(Zip::from(&product)
            .and(&self.mass)
            .and(&mask)
            .fold(0.0, |acc, &f, &w, &inside| if inside { acc + f * w } else { acc }))
    }

    fn multiply(&self, fields: &[ArrayView1<'_, f64>]) -> Result<Array1<f64>> {
        let mut product = Array1::ones(self.mass.len());
        for field in fields {
            if field.len() != self.mass.len() {
                return Err(SlepianError::Dimension {
                    what: "mesh field",
                    expected: self.mass.len(),
                    actual: field.len(),
                });
            }
            product *= field;
        }
        Ok(product)
    }
}

/// Full-sphere area, `4 pi`.
pub const SPHERE_AREA: f64 = 4.0 * PI;

/// Gauss-Legendre nodes and weights on `[a, b]`, exact for polynomials of
/// degree `2n - 1`.
pub fn gauss_legendre(n: usize, a: f64, b: f64) -> (Vec<f64>, Vec<f64>) {
    let mut nodes = vec![0.0; n];
    let mut weights = vec![0.0; n];
    let half = (b - a) / 2.0;
    let mid = (a + b) / 2.0;
    let nf = n as f64;
    for i in 0..(n + 1) / 2 {
        let mut z = (PI * (i as f64 + 0.75) / (nf + 0.5)).cos();
        let mut slope = 1.0;
        for _ in 0..100 {
            let (mut p1, mut p2) = (1.0, 0.0);
            for j in 1..=n {
                let jf = j as f64;
                let p3 = p2;
                p2 = p1;
                p1 = ((2.0 * jf - 1.0) * z * p2 - (jf - 1.0) * p3) / jf;
            }
            slope = nf * (z * p1 - p2) / (z * z - 1.0);
            let step = p1 / slope;
            z -= step;
            if step.abs() < 1e-15 {
                break;
            }
        }
        let w = 2.0 / ((1.0 - z * z) * slope * slope);
        nodes[i] = mid - half * z;
        nodes[n - 1 - i] = mid + half * z;
        weights[i] = w * half;
        weights[n - 1 - i] = w * half;
    }
    (nodes, weights)
}
