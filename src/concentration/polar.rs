use std::f64::consts::PI;

use rustfft::num_complex::Complex64;

use super::ConcentrationKernel;
use crate::error::{Result, SlepianError};
use crate::harmonic::ind2elm;
use crate::harmonic::legendre::{legendre_table, triangular_index};
use crate::quadrature::gauss_legendre;

/// Closed-form kernel of a polar cap.
///
/// The cap is invariant under rotations about the pole, so `D` couples only
/// equal orders and `D[(l, m), (l', m)] = 2 pi int P_l^m P_l'^m dx` over the
/// cap's `cos(theta)` interval. Gauss-Legendre with `L` nodes per interval
/// integrates these products exactly.
pub struct PolarCapKernel {
    bandlimit: usize,
    weights: Vec<f64>,
    tables: Vec<Vec<f64>>,
}

impl PolarCapKernel {
    pub fn new(bandlimit: usize, theta_max: f64, gap: bool) -> Result<Self> {
        if !(0.0..=PI).contains(&theta_max) {
            return Err(SlepianError::config(
                "theta_max",
                "must lie within [0, pi]",
            ));
        }
        let nodes_per_interval = bandlimit.max(1);
        let edge = theta_max.cos();
        let (mut nodes, mut weights) = gauss_legendre(nodes_per_interval, edge, 1.0);
        if gap {
            let (south_nodes, south_weights) = gauss_legendre(nodes_per_interval, -1.0, -edge);
            nodes.extend(south_nodes);
            weights.extend(south_weights);
        }
        let tables = nodes.iter().map(|&x| legendre_table(bandlimit, x)).collect();
        Ok(Self {
            bandlimit,
            weights,
            tables,
        })
    }

    pub fn integral(&self, i: usize, j: usize) -> f64 {
        let (ell_i, m_i) = ind2elm(i);
        let (ell_j, m_j) = ind2elm(j);
        if m_i != m_j {
            return 0.0;
        }
        let m = m_i.unsigned_abs() as usize;
        let (a, b) = (triangular_index(ell_i, m), triangular_index(ell_j, m));
        2.0 * PI
            * self
                .weights
                .iter()
                .zip(&self.tables)
                .map(|(w, table)| w * table[a] * table[b])
                .sum::<f64>()
    }
}

impl ConcentrationKernel for PolarCapKernel {
    type Elem = Complex64;

    fn size(&self) -> usize {
        self.bandlimit * self.bandlimit
    }

    fn fill_row(&self, row: usize, out: &mut [Complex64]) -> Result<()> {
        for (col, slot) in out.iter_mut().enumerate().take(row + 1) {
            *slot = Complex64::new(self.integral(row, col), 0.0);
        }
        Ok(())
    }
}
