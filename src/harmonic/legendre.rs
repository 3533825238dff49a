use std::f64::consts::PI;

/// Position of `(ell, m)` with `0 <= m <= ell` in a triangular table.
#[inline]
pub fn triangular_index(ell: usize, m: usize) -> usize {
    ell * (ell + 1) / 2 + m
}

/// Orthonormalised associated Legendre functions `P_ell^m(x)` for
/// `0 <= m <= ell < bandlimit`, including the Condon-Shortley phase.
///
/// `Y_ell^m(theta, phi) = P_ell^m(cos theta) e^{i m phi}` for `m >= 0`.
pub fn legendre_table(bandlimit: usize, x: f64) -> Vec<f64> {
    let mut table = vec![0.0; bandlimit * (bandlimit + 1) / 2];
    if bandlimit == 0 {
        return table;
    }
    let s = (1.0 - x * x).max(0.0).sqrt();
    let mut pmm = (1.0 / (4.0 * PI)).sqrt();
    for m in 0..bandlimit {
        if m > 0 {
            let mf = m as f64;
            pmm *= -((2.0 * mf + 1.0) / (2.0 * mf)).sqrt() * s;
        }
        table[triangular_index(m, m)] = pmm;
        if m + 1 < bandlimit {
            table[triangular_index(m + 1, m)] = x * ((2 * m + 3) as f64).sqrt() * pmm;
        }
        for ell in (m + 2)..bandlimit {
            let lf = ell as f64;
            let mf = m as f64;
            let a = ((4.0 * lf * lf - 1.0) / (lf * lf - mf * mf)).sqrt();
            let b = (((lf - 1.0) * (lf - 1.0) - mf * mf) / (4.0 * (lf - 1.0) * (lf - 1.0) - 1.0))
                .sqrt();
            table[triangular_index(ell, m)] = a
                * (x * table[triangular_index(ell - 1, m)] - b * table[triangular_index(ell - 2, m)]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn low_degree_closed_forms() {
        let theta: f64 = 0.7;
        let x = theta.cos();
        let table = legendre_table(3, x);
        assert_relative_eq!(table[triangular_index(0, 0)], (1.0 / (4.0 * PI)).sqrt());
        assert_relative_eq!(
            table[triangular_index(1, 0)],
            (3.0 / (4.0 * PI)).sqrt() * x,
            epsilon = 1e-14
        );
        assert_relative_eq!(
            table[triangular_index(1, 1)],
            -(3.0 / (8.0 * PI)).sqrt() * theta.sin(),
            epsilon = 1e-14
        );
        assert_relative_eq!(
            table[triangular_index(2, 0)],
            (5.0 / (16.0 * PI)).sqrt() * (3.0 * x * x - 1.0),
            epsilon = 1e-14
        );
    }

    #[test]
    fn orthonormal_under_gauss_sum() {
        // midpoint sum over a fine colatitude grid approximates the integral
        let n = 4000;
        let bandlimit = 5;
        let mut gram = vec![0.0; 2];
        for t in 0..n {
            let theta = PI * (t as f64 + 0.5) / n as f64;
            let table = legendre_table(bandlimit, theta.cos());
            let w = 2.0 * PI * theta.sin() * PI / n as f64;
            gram[0] += w * table[triangular_index(3, 1)].powi(2);
            gram[1] += w * table[triangular_index(3, 1)] * table[triangular_index(4, 1)];
        }
        assert_relative_eq!(gram[0], 1.0, epsilon = 1e-5);
        assert_relative_eq!(gram[1], 0.0, epsilon = 1e-5);
    }
}
