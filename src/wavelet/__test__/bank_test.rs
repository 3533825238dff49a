//! Wavelet bank analysis and synthesis

use approx::assert_relative_eq;
use ndarray::{array, Array1};
use rustfft::num_complex::Complex64;

use crate::error::SlepianError;
use crate::harmonic::elm2ind;
use crate::wavelet::{create_kappas, sifting_convolution, WaveletBank, WaveletDomain};

fn signal(n: usize) -> Array1<Complex64> {
    Array1::from_shape_fn(n, |i| Complex64::new(1.0 + (0.7 * i as f64).cos(), (0.2 * i as f64).sin()))
}

#[test]
fn test_slepian_round_trip() {
    let bank = WaveletBank::slepian(4, 2, 0).unwrap();
    assert_eq!(bank.domain(), WaveletDomain::Slepian);
    assert_eq!(bank.size(), 16);
    assert_eq!(bank.n_scales(), bank.j_max() - bank.j_min() + 2);
    let f = signal(16);
    for shannon in [16, 7] {
        let w = bank.forward(f.view(), shannon).unwrap();
        let back = bank.inverse(&w, shannon).unwrap();
        assert_eq!(back.len(), shannon);
        for k in 0..shannon {
            assert_relative_eq!(back[k].re, f[k].re, epsilon = 1e-12);
            assert_relative_eq!(back[k].im, f[k].im, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_zero_scales_are_dropped() {
    let bank = WaveletBank::slepian(4, 2, 0).unwrap();
    let f = signal(16);
    let w = bank.forward(f.view(), 2).unwrap();
    assert_eq!(w.scales(), &[0, 1]);
    assert!(w.scale(3).is_none());
    let back = bank.inverse(&w, 2).unwrap();
    assert_relative_eq!(back[0].re, f[0].re, epsilon = 1e-12);
    assert_relative_eq!(back[1].im, f[1].im, epsilon = 1e-12);
}

#[test]
fn test_real_coefficients() {
    let bank = WaveletBank::slepian_axis(10, 3, 1).unwrap();
    let f = Array1::from_shape_fn(10, |k| (k as f64 - 4.5).powi(2));
    let w = bank.forward(f.view(), 10).unwrap();
    let back = bank.inverse(&w, 10).unwrap();
    for (a, b) in f.iter().zip(back.iter()) {
        assert_relative_eq!(a, b, epsilon = 1e-10);
    }
}

#[test]
fn test_harmonic_filters_depend_on_degree_only() {
    let bank = WaveletBank::harmonic(6, 2, 1).unwrap();
    let kappas = create_kappas(6, 2, 1).unwrap();
    assert_eq!(bank.size(), 36);
    for s in 0..bank.n_scales() {
        for ell in 0..6usize {
            for m in -(ell as i64)..=(ell as i64) {
                assert_eq!(bank.filters()[[s, elm2ind(ell, m)]], kappas[[s, ell]]);
            }
        }
    }
    let f = signal(36);
    let w = bank.forward(f.view(), 36).unwrap();
    let back = bank.inverse(&w, 36).unwrap();
    for (a, b) in f.iter().zip(back.iter()) {
        assert_relative_eq!(a.re, b.re, epsilon = 1e-12);
        assert_relative_eq!(a.im, b.im, epsilon = 1e-12);
    }
}

#[test]
fn test_scale_validation() {
    let bank = WaveletBank::slepian(4, 2, 1).unwrap();
    let limit = bank.j_max() - bank.j_min();
    assert!(bank.filter(None).is_ok());
    assert!(bank.filter(Some(limit)).is_ok());
    assert!(matches!(
        bank.filter(Some(limit + 1)),
        Err(SlepianError::Configuration { parameter: "j", .. })
    ));
}

#[test]
fn test_length_errors() {
    let bank = WaveletBank::slepian(3, 2, 0).unwrap();
    let f = signal(9);
    assert!(bank.forward(f.view(), 10).is_err());
    let w = bank.forward(f.view(), 9).unwrap();
    assert!(matches!(bank.inverse(&w, 8), Err(SlepianError::Dimension { .. })));
}

#[test]
fn test_sifting_convolution_is_elementwise() {
    let filters = array![[1.0, 0.5, 0.0], [0.0, 2.0, 3.0]];
    let out = sifting_convolution(filters.view(), array![2.0, 4.0, 6.0].view(), 2).unwrap();
    assert_eq!(out, array![[2.0, 2.0], [0.0, 8.0]]);
}
