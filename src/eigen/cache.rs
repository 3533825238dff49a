//! Persistence of eigensolutions keyed by problem identity.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};
use ndarray_npy::{read_npy, write_npy};
use parking_lot::Mutex;
use tracing::{debug, info};

use super::EigenDecomposition;
use crate::concentration::Coefficient;
use crate::error::Result;

const EIGENVALUES_FILE: &str = "eigenvalues.npy";
const EIGENVECTORS_FILE: &str = "eigenvectors.npy";

/// Filesystem-safe identity of a decomposition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Any character outside `[A-Za-z0-9_.-]` becomes `_`.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let clean = raw
            .as_ref()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self(clean)
    }

    /// `slepian_{suffix}_L{L}`, plus `_N{N}` when only `N` rows are kept.
    pub fn sphere(region_suffix: &str, bandlimit: usize, kept_rows: Option<usize>) -> Self {
        match kept_rows {
            Some(n) => Self::new(format!("slepian_{region_suffix}_L{bandlimit}_N{n}")),
            None => Self::new(format!("slepian_{region_suffix}_L{bandlimit}")),
        }
    }

    pub fn mesh(mesh_name: &str, basis_size: usize, kept_rows: usize) -> Self {
        Self::new(format!(
            "meshes_laplacians_slepian_functions_{mesh_name}_b{basis_size}_N{kept_rows}"
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage backend for eigensolutions and split-job partial matrices.
///
/// Loaded data is trusted as-is; shapes are not checked against the
/// requesting problem.
pub trait EigenCache<T: Coefficient>: Send + Sync {
    fn load(&self, key: &CacheKey) -> Result<Option<EigenDecomposition<T>>>;

    fn store(&self, key: &CacheKey, decomposition: &EigenDecomposition<T>) -> Result<()>;

    fn store_partial(&self, key: &CacheKey, label: &str, matrix: &Array2<T>) -> Result<()>;
}

/// One directory per key holding `eigenvalues.npy` and `eigenvectors.npy`.
#[derive(Debug, Clone)]
pub struct NpyDiskCache {
    root: PathBuf,
}

impl NpyDiskCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn key_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.as_str())
    }

    pub fn partial_path(&self, key: &CacheKey, label: &str) -> PathBuf {
        self.key_dir(key).join(format!("{label}.npy"))
    }
}

impl<T: Coefficient> EigenCache<T> for NpyDiskCache {
    fn load(&self, key: &CacheKey) -> Result<Option<EigenDecomposition<T>>> {
        let dir = self.key_dir(key);
        let values = dir.join(EIGENVALUES_FILE);
        let vectors = dir.join(EIGENVECTORS_FILE);
        if !values.exists() || !vectors.exists() {
            debug!(%key, "no cached eigensolution");
            return Ok(None);
        }
        info!(%key, "binaries found - loading...");
        let eigenvalues: Array1<f64> = read_npy(values)?;
        let eigenvectors: Array2<T> = read_npy(vectors)?;
        EigenDecomposition::new(eigenvalues, eigenvectors).map(Some)
    }

    fn store(&self, key: &CacheKey, decomposition: &EigenDecomposition<T>) -> Result<()> {
        let dir = self.key_dir(key);
        fs::create_dir_all(&dir)?;
        info!(%key, rows = decomposition.rank(), "saving binaries...");
        write_npy(dir.join(EIGENVALUES_FILE), &decomposition.eigenvalues())?;
        write_npy(dir.join(EIGENVECTORS_FILE), &decomposition.eigenvectors())?;
        Ok(())
    }

    fn store_partial(&self, key: &CacheKey, label: &str, matrix: &Array2<T>) -> Result<()> {
        fs::create_dir_all(self.key_dir(key))?;
        write_npy(self.partial_path(key, label), matrix)?;
        Ok(())
    }
}

/// Process-local cache, mostly for tests and repeated builds in one run.
pub struct InMemoryCache<T> {
    entries: Mutex<HashMap<CacheKey, EigenDecomposition<T>>>,
    partials: Mutex<HashMap<(CacheKey, String), Array2<T>>>,
}

impl<T> Default for InMemoryCache<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            partials: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Coefficient> InMemoryCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn partial(&self, key: &CacheKey, label: &str) -> Option<Array2<T>> {
        self.partials
            .lock()
            .get(&(key.clone(), label.to_string()))
            .cloned()
    }
}

impl<T: Coefficient> EigenCache<T> for InMemoryCache<T> {
    fn load(&self, key: &CacheKey) -> Result<Option<EigenDecomposition<T>>> {
        let hit = self.entries.lock().get(key).cloned();
        if hit.is_some() {
            info!(%key, "binaries found - loading...");
        }
        Ok(hit)
    }

    fn store(&self, key: &CacheKey, decomposition: &EigenDecomposition<T>) -> Result<()> {
        self.entries
            .lock()
            .insert(key.clone(), decomposition.clone());
        Ok(())
    }

    fn store_partial(&self, key: &CacheKey, label: &str, matrix: &Array2<T>) -> Result<()> {
        self.partials
            .lock()
            .insert((key.clone(), label.to_string()), matrix.clone());
        Ok(())
    }
}

/// Never hits, drops every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl<T: Coefficient> EigenCache<T> for NoCache {
    fn load(&self, _key: &CacheKey) -> Result<Option<EigenDecomposition<T>>> {
        Ok(None)
    }

    fn store(&self, _key: &CacheKey, _decomposition: &EigenDecomposition<T>) -> Result<()> {
        Ok(())
    }

    fn store_partial(&self, _key: &CacheKey, _label: &str, _matrix: &Array2<T>) -> Result<()> {
        Ok(())
    }
}
