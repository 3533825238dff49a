//! Run configuration.
//!
//! Every field has a default so a config file only needs the keys it wants
//! to change:
//!
//! ```toml
//! samples = 2
//! workers = 4
//! save_matrices = true
//! data_dir = "data/slepian"
//! mask_dir = "data/slepian/masks"
//! quadrature = "fejer"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlepianError};
use crate::quadrature::QuadratureRule;

/// Settings shared by the matrix builder, caches and mask loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlepianConfig {
    /// Oversampling of the sampling grid relative to the bandlimit.
    pub samples: usize,
    /// Number of worker threads used to fill the concentration matrix.
    pub workers: usize,
    /// Persist eigensolutions and partial matrices through the cache.
    pub save_matrices: bool,
    /// Root directory of the disk cache.
    pub data_dir: PathBuf,
    /// Directory holding arbitrary-region mask assets.
    pub mask_dir: PathBuf,
    /// Colatitude quadrature rule of the region integrals.
    pub quadrature: QuadratureRule,
}

impl Default for SlepianConfig {
    fn default() -> Self {
        Self {
            samples: 2,
            workers: default_workers(),
            save_matrices: true,
            data_dir: PathBuf::from("data/slepian"),
            mask_dir: PathBuf::from("data/slepian/masks"),
            quadrature: QuadratureRule::Fejer,
        }
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl SlepianConfig {
    /// Parses a TOML document, filling missing keys with defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: SlepianConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    pub fn with_quadrature(mut self, quadrature: QuadratureRule) -> Self {
        self.quadrature = quadrature;
        self
    }

    pub fn with_save_matrices(mut self, save: bool) -> Self {
        self.save_matrices = save;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    pub fn with_mask_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.mask_dir = dir.into();
        self
    }

    /// Sampling resolution used for masks and integrals at bandlimit `l`.
    pub fn resolution(&self, l: usize) -> usize {
        self.samples * l
    }

    pub fn validate(&self) -> Result<()> {
        if self.samples == 0 {
            return Err(SlepianError::config("samples", "must be at least 1"));
        }
        if self.workers == 0 {
            return Err(SlepianError::config("workers", "must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = SlepianConfig::from_toml_str("").unwrap();
        assert_eq!(config.samples, 2);
        assert!(config.save_matrices);
        assert_eq!(config.quadrature, QuadratureRule::Fejer);
        assert!(config.workers >= 1);
    }

    #[test]
    fn partial_document_overrides() {
        let config = SlepianConfig::from_toml_str(
            "workers = 3\nquadrature = \"riemann\"\nsave_matrices = false\n",
        )
        .unwrap();
        assert_eq!(config.workers, 3);
        assert_eq!(config.quadrature, QuadratureRule::Riemann);
        assert!(!config.save_matrices);
        assert_eq!(config.resolution(8), 16);
    }

    #[test]
    fn zero_workers_rejected() {
        let err = SlepianConfig::from_toml_str("workers = 0").unwrap_err();
        assert!(err.to_string().contains("workers"));
    }
}
