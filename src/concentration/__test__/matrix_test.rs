//! Sphere concentration matrix: symmetry, parallel fill, split jobs

use std::f64::consts::PI;

use approx::assert_relative_eq;
use ndarray::Array2;
use rustfft::num_complex::Complex64;

use crate::concentration::{
    fill_rows, is_hermitian, ConcentrationBuilder, ConcentrationKernel, DegreeRange,
    SphereKernel,
};
use crate::eigen::{solve_hermitian, CacheKey, InMemoryCache};
use crate::error::{Result, SlepianError};
use crate::harmonic::{EquiangularTransform, SignalTransform};
use crate::quadrature::{QuadratureRule, SphereIntegrator};

fn polar_setup(l: usize, theta_max: f64) -> (EquiangularTransform, SphereIntegrator, Array2<f64>) {
    let transform = EquiangularTransform::new(l, 2 * l).unwrap();
    let integrator = SphereIntegrator::new(transform.grid(), QuadratureRule::Fejer);
    let mask = transform
        .grid()
        .map(|theta, _| if theta <= theta_max { 1.0 } else { 0.0 });
    (transform, integrator, mask)
}

fn lat_lon_setup(l: usize) -> (EquiangularTransform, SphereIntegrator, Array2<f64>) {
    let transform = EquiangularTransform::new(l, 2 * l).unwrap();
    let integrator = SphereIntegrator::new(transform.grid(), QuadratureRule::Fejer);
    let mask = transform.grid().map(|theta, phi| {
        if theta <= PI / 2.0 && phi <= PI / 3.0 {
            1.0
        } else {
            0.0
        }
    });
    (transform, integrator, mask)
}

#[test]
fn test_matrix_is_exactly_hermitian() {
    let (transform, integrator, mask) = lat_lon_setup(4);
    let kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    let matrix = ConcentrationBuilder::new(3).build(&kernel).unwrap();
    assert!(is_hermitian(&matrix));
}

#[test]
fn test_serial_equals_parallel() {
    let (transform, integrator, mask) = lat_lon_setup(5);
    let serial_kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    let serial = ConcentrationBuilder::new(1).build(&serial_kernel).unwrap();
    let parallel_kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    let parallel = ConcentrationBuilder::new(4).build(&parallel_kernel).unwrap();
    assert_eq!(serial, parallel);
}

#[test]
fn test_order_zero_shortcut_matches_direct_integration() {
    let (transform, integrator, mask) = lat_lon_setup(4);
    let kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    let matrix = ConcentrationBuilder::new(2).build(&kernel).unwrap();
    let n = kernel.size();
    for i in 0..n {
        for j in 0..=i {
            let direct = kernel.integral(i, j).unwrap();
            assert_relative_eq!(matrix[[i, j]].re, direct.re, epsilon = 1e-12);
            assert_relative_eq!(matrix[[i, j]].im, direct.im, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_whole_sphere_gives_identity() {
    let (transform, integrator, mask) = polar_setup(4, PI);
    let kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    let matrix = ConcentrationBuilder::new(2).build(&kernel).unwrap();
    for ((i, j), value) in matrix.indexed_iter() {
        let expected = if i == j { 1.0 } else { 0.0 };
        assert_relative_eq!(value.re, expected, epsilon = 1e-10);
        assert_relative_eq!(value.im, 0.0, epsilon = 1e-10);
    }
}

#[test]
fn test_eigenvalues_in_unit_interval_and_sorted() {
    let (transform, integrator, mask) = polar_setup(6, 40f64.to_radians());
    let kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    let matrix = ConcentrationBuilder::new(3).build(&kernel).unwrap();
    let eig = solve_hermitian(&matrix).unwrap();
    let values = eig.eigenvalues();
    for window in values.to_vec().windows(2) {
        assert!(window[0] >= window[1]);
    }
    for &v in values.iter() {
        assert!(v >= -1e-10 && v <= 1.0 + 1e-10, "eigenvalue {v} outside [0, 1]");
    }
    // trace equals the region area times L^2 / 4 pi
    let trace: f64 = (0..kernel.size()).map(|i| matrix[[i, i]].re).sum();
    let area = integrator.area(mask.view()).unwrap();
    assert_relative_eq!(trace, area * 36.0 / (4.0 * PI), epsilon = 1e-9);
}

#[test]
fn test_every_field_is_synthesised_once() {
    let (transform, integrator, mask) = polar_setup(3, 1.0);
    let kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    assert_eq!(kernel.cached_fields(), 0);
    ConcentrationBuilder::new(2).build(&kernel).unwrap();
    assert_eq!(kernel.cached_fields(), 9);
}

#[test]
fn test_sub_range_signals_large_job() {
    let (transform, integrator, mask) = polar_setup(3, 1.0);
    let kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    let cache = InMemoryCache::<Complex64>::new();
    let key = CacheKey::sphere("polar57", 3, None);
    let err = ConcentrationBuilder::new(2)
        .build_degrees(&kernel, DegreeRange::new(1, 2), &cache, &key)
        .unwrap_err();
    match err {
        SlepianError::LargeJobSplit { rows, total, label } => {
            assert_eq!(rows, 1..4);
            assert_eq!(total, 9);
            assert_eq!(label, "D_min1_max2");
        }
        other => panic!("unexpected error {other}"),
    }
    let partial = cache.partial(&key, "D_min1_max2").unwrap();
    assert_eq!(partial[[0, 0]], Complex64::new(0.0, 0.0));
    assert!(partial[[2, 2]].re > 0.0);
    assert_eq!(partial[[4, 4]], Complex64::new(0.0, 0.0));
}

#[test]
fn test_full_degree_range_builds_matrix() {
    let (transform, integrator, mask) = polar_setup(3, 1.0);
    let kernel = SphereKernel::new(&transform, &integrator, mask.view()).unwrap();
    let cache = InMemoryCache::<Complex64>::new();
    let key = CacheKey::sphere("polar57", 3, None);
    let matrix = ConcentrationBuilder::new(2)
        .build_degrees(&kernel, DegreeRange::new(0, 3), &cache, &key)
        .unwrap();
    assert!(is_hermitian(&matrix));
    assert!(ConcentrationBuilder::new(2)
        .build_degrees(&kernel, DegreeRange::new(0, 4), &cache, &key)
        .is_err());
}

struct FailingKernel;

impl ConcentrationKernel for FailingKernel {
    type Elem = f64;

    fn size(&self) -> usize {
        8
    }

    fn fill_row(&self, row: usize, out: &mut [f64]) -> Result<()> {
        if row == 5 {
            return Err(SlepianError::Unsupported("row five".into()));
        }
        out[row] = 1.0;
        Ok(())
    }
}

#[test]
fn test_worker_failure_names_chunk() {
    let err = fill_rows(&FailingKernel, 0..8, 2).unwrap_err();
    match err {
        SlepianError::Concurrency { rows, source } => {
            assert_eq!(rows, 4..8);
            assert!(source.to_string().contains("row five"));
        }
        other => panic!("unexpected error {other}"),
    }
}
