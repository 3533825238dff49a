//! Sphere and mesh pipelines with caches

use std::f64::consts::PI;

use approx::assert_relative_eq;
use ndarray::Array2;
use ndarray_npy::write_npy;
use rustfft::num_complex::Complex64;

use crate::concentration::{DegreeRange, MeshDomain};
use crate::config::SlepianConfig;
use crate::eigen::{CacheKey, InMemoryCache, NoCache, NpyDiskCache};
use crate::error::SlepianError;
use crate::harmonic::{EquiangularTransform, SignalTransform};
use crate::quadrature::QuadratureRule;
use crate::region::{MeshBox, Region};
use crate::slepian::{shannon_number, SlepianMesh, SlepianSphere};

fn config() -> SlepianConfig {
    SlepianConfig::default()
        .with_workers(2)
        .with_quadrature(QuadratureRule::Fejer)
}

fn assert_unit_interval_descending(values: &[f64]) {
    for window in values.windows(2) {
        assert!(window[0] >= window[1]);
    }
    for &v in values {
        assert!(v > -1e-10 && v < 1.0 + 1e-10, "eigenvalue {v} outside [0, 1]");
    }
}

#[test]
fn test_polar_cap_shannon_number() {
    let transform = EquiangularTransform::new(6, 12).unwrap();
    let region = Region::polar_cap(40f64.to_radians(), false).unwrap();
    let slepian = SlepianSphere::compute(&transform, region, &config(), &NoCache).unwrap();
    assert_eq!(slepian.shannon_number(), 4);
    assert_eq!(slepian.basis().rank(), 36);
    assert_unit_interval_descending(&slepian.basis().eigenvalues().to_vec());
    // well concentrated leading function
    assert!(slepian.basis().eigenvalue(0).unwrap() > 0.8);
    assert_eq!(shannon_number(4.0 * PI, 6), 36);
}

#[test]
fn test_lat_lon_region_eigenvalues() {
    let transform = EquiangularTransform::new(5, 10).unwrap();
    let region = Region::lat_lon(0.0, PI / 2.0, 0.0, PI).unwrap();
    let slepian = SlepianSphere::compute(&transform, region, &config(), &NoCache).unwrap();
    assert_unit_interval_descending(&slepian.basis().eigenvalues().to_vec());
    // roughly a quarter of the sphere
    assert!(slepian.area() > 0.9 * PI && slepian.area() < 1.2 * PI);
    assert_eq!(slepian.shannon_number(), shannon_number(slepian.area(), 5));
}

#[test]
fn test_arbitrary_region_truncates_and_caches_on_disk() {
    let data = tempfile::tempdir().unwrap();
    let masks = tempfile::tempdir().unwrap();
    let transform = EquiangularTransform::new(4, 8).unwrap();
    let mask = transform
        .grid()
        .map(|theta, phi| theta < PI / 2.0 && phi < PI);
    write_npy(masks.path().join("half_L8.npy"), &mask).unwrap();

    let config = config()
        .with_data_dir(data.path())
        .with_mask_dir(masks.path());
    let cache = NpyDiskCache::new(&config.data_dir);
    let region = Region::arbitrary("half").unwrap();
    let first = SlepianSphere::compute(&transform, region.clone(), &config, &cache).unwrap();
    let n = first.shannon_number();
    assert_eq!(first.basis().rank(), n);
    assert_eq!(first.basis().eigenvalues().len(), 16);

    let key = CacheKey::sphere("half", 4, Some(n));
    assert!(cache.key_dir(&key).join("eigenvalues.npy").exists());

    let second = SlepianSphere::compute(&transform, region, &config, &cache).unwrap();
    assert_eq!(second.basis(), first.basis());
}

#[test]
fn test_save_matrices_off_skips_cache() {
    let transform = EquiangularTransform::new(3, 6).unwrap();
    let cache = InMemoryCache::<Complex64>::new();
    let region = Region::polar_cap(0.8, false).unwrap();
    let config = config().with_save_matrices(false);
    SlepianSphere::compute(&transform, region.clone(), &config, &cache).unwrap();
    assert!(cache.is_empty());
    SlepianSphere::compute(&transform, region, &config.with_save_matrices(true), &cache).unwrap();
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_degree_window_stores_partial_matrix() {
    let data = tempfile::tempdir().unwrap();
    let transform = EquiangularTransform::new(4, 8).unwrap();
    let cache = NpyDiskCache::new(data.path());
    let region = Region::lat_lon(0.0, 1.0, 0.0, 2.0).unwrap();
    let err = SlepianSphere::compute_degrees(
        &transform,
        region.clone(),
        &config(),
        &cache,
        Some(DegreeRange::new(0, 2)),
    )
    .unwrap_err();
    assert!(err.is_large_job_split());
    let key = CacheKey::sphere(&region.name_suffix(), 4, None);
    assert!(cache.partial_path(&key, "D_min0_max2").exists());
}

#[test]
fn test_gap_beyond_equator_rejected() {
    let transform = EquiangularTransform::new(3, 6).unwrap();
    let region = Region::polar_cap(2.0, true).unwrap();
    let err = SlepianSphere::compute(&transform, region, &config(), &NoCache).unwrap_err();
    assert!(matches!(err, SlepianError::Configuration { parameter: "theta_max", .. }));
}

#[test]
fn test_mesh_pipeline_keeps_shannon_rows() {
    let n = 8;
    let vertices = Array2::from_shape_fn((n, 3), |(v, axis)| if axis == 0 { v as f64 } else { 0.0 });
    let basis = Array2::from_shape_fn((n, n), |(k, v)| {
        (PI * k as f64 * (v as f64 + 0.5) / n as f64).cos()
    });
    let region = MeshBox {
        x_max: 2.5,
        ..MeshBox::default()
    };
    let domain = MeshDomain::new("strip", vertices, basis, None, &region)
        .unwrap()
        .orthonormalise()
        .unwrap();
    let cache = InMemoryCache::<f64>::new();
    let slepian = SlepianMesh::compute(&domain, &config(), &cache).unwrap();
    assert_eq!(slepian.shannon_number(), 3);
    assert_eq!(slepian.basis().rank(), 3);
    for p in 0..3 {
        assert_relative_eq!(slepian.basis().eigenvalue(p).unwrap(), 1.0, epsilon = 1e-10);
    }
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_default_config_keeps_eigenvalues_in_unit_interval() {
    let config = SlepianConfig::default().with_workers(2);
    let transform = EquiangularTransform::new(6, config.resolution(6)).unwrap();
    let region = Region::lat_lon(0.0, 0.9 * PI, 0.0, 1.9 * PI).unwrap();
    let slepian = SlepianSphere::compute(&transform, region, &config, &NoCache).unwrap();
    let values = slepian.basis().eigenvalues().to_vec();
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    assert!(max <= 1.0 + 1e-10, "largest eigenvalue {max}");
    assert_unit_interval_descending(&values);
}

#[test]
fn test_degree_window_requires_save_matrices() {
    let transform = EquiangularTransform::new(4, 8).unwrap();
    let cache = InMemoryCache::<Complex64>::new();
    let region = Region::lat_lon(0.0, 1.0, 0.0, 2.0).unwrap();
    let err = SlepianSphere::compute_degrees(
        &transform,
        region.clone(),
        &config().with_save_matrices(false),
        &cache,
        Some(DegreeRange::new(0, 2)),
    )
    .unwrap_err();
    assert!(matches!(err, SlepianError::Configuration { parameter: "save_matrices", .. }));
    assert!(cache.is_empty());

    // the full window is still fine without saving
    let full = SlepianSphere::compute_degrees(
        &transform,
        region,
        &config().with_save_matrices(false),
        &cache,
        Some(DegreeRange::new(0, 4)),
    )
    .unwrap();
    assert_eq!(full.basis().eigenvalues().len(), 16);
}
