use ndarray::{Array2, ArrayView2};
use once_cell::sync::OnceCell;
use rustfft::num_complex::Complex64;

use super::ConcentrationKernel;
use crate::error::Result;
use crate::harmonic::{elm2ind, ind2elm, SignalTransform};
use crate::quadrature::{weighted_inner_product, SphereIntegrator};

/// Row kernel of the sphere concentration matrix.
///
/// Basis fields are synthesised on first use and shared between workers for
/// the lifetime of the kernel.
pub struct SphereKernel<'a, T: SignalTransform + ?Sized> {
    transform: &'a T,
    region_weight: Array2<f64>,
    fields: Vec<OnceCell<Array2<Complex64>>>,
}

impl<'a, T: SignalTransform + ?Sized> SphereKernel<'a, T> {
    pub fn new(
        transform: &'a T,
        integrator: &SphereIntegrator,
        mask: ArrayView2<'_, f64>,
    ) -> Result<Self> {
        let region_weight = integrator.region_weight(mask)?;
        let n = transform.bandlimit() * transform.bandlimit();
        let fields = (0..n).map(|_| OnceCell::new()).collect();
        Ok(Self {
            transform,
            region_weight,
            fields,
        })
    }

    fn field(&self, index: usize) -> Result<&Array2<Complex64>> {
        self.fields[index].get_or_try_init(|| {
            let flm = self.transform.create_basis_function(index)?;
            self.transform.inverse(flm.view())
        })
    }

    /// `int_R Y_i conj(Y_j)`.
    pub fn integral(&self, i: usize, j: usize) -> Result<Complex64> {
        let f = self.field(i)?;
        let g = self.field(j)?;
        Ok(weighted_inner_product(
            self.region_weight.view(),
            f.view(),
            g.view(),
        ))
    }

    /// Number of basis fields synthesised so far.
    pub fn cached_fields(&self) -> usize {
        self.fields.iter().filter(|cell| cell.get().is_some()).count()
    }
}

impl<T: SignalTransform + ?Sized> ConcentrationKernel for SphereKernel<'_, T> {
    type Elem = Complex64;

    fn size(&self) -> usize {
        self.fields.len()
    }

    fn fill_row(&self, row: usize, out: &mut [Complex64]) -> Result<()> {
        let (ell_i, m_i) = ind2elm(row);
        for col in 0..=row {
            let (ell_c, m_c) = ind2elm(col);
            if m_i == 0 && m_c != 0 {
                // real Y_i: D[i][(l, -m)] = (-1)^m conj(D[i][(l, m)])
                if m_c > 0 {
                    let value = self.integral(row, col)?;
                    out[col] = value;
                    let sign = if m_c % 2 == 0 { 1.0 } else { -1.0 };
                    out[elm2ind(ell_c, -m_c)] = value.conj() * sign;
                } else if ell_c == ell_i {
                    out[col] = self.integral(row, col)?;
                }
            } else {
                out[col] = self.integral(row, col)?;
            }
        }
        Ok(())
    }
}
