//! Slepian concentration on the sphere and on meshes.
//!
//! A region (polar cap, latitude/longitude box, arbitrary mask or mesh box)
//! defines a Hermitian concentration matrix over a band-limited basis. Its
//! eigenvectors form the Slepian basis, ranked by how well each function is
//! concentrated in the region. On top of that basis sit a scale-discretised
//! wavelet bank and hard-threshold denoising.
//!
//! ```no_run
//! use slepian::{EquiangularTransform, NoCache, Region, SlepianConfig, SlepianSphere};
//!
//! # fn main() -> slepian::Result<()> {
//! let config = SlepianConfig::default();
//! let transform = EquiangularTransform::new(16, config.resolution(16))?;
//! let region = Region::polar_cap(40f64.to_radians(), false)?;
//! let slepian = SlepianSphere::compute(&transform, region, &config, &NoCache)?;
//! println!("Shannon number {}", slepian.shannon_number());
//! # Ok(())
//! # }
//! ```

pub mod concentration;
pub mod config;
pub mod denoise;
pub mod eigen;
pub mod error;
pub mod harmonic;
pub mod logging;
pub mod quadrature;
pub mod region;
pub mod slepian;
pub mod wavelet;

#[cfg(feature = "python")]
mod bindings;

pub use concentration::{ConcentrationBuilder, ConcentrationKernel, DegreeRange, MeshDomain};
pub use config::SlepianConfig;
pub use denoise::{compute_snr, DenoiseReport, DenoisingEngine, NoiseGenerator};
pub use eigen::{solve_hermitian, CacheKey, EigenCache, EigenDecomposition, InMemoryCache, NoCache, NpyDiskCache};
pub use error::{Result, SlepianError};
pub use harmonic::{EquiangularTransform, EulerAngles, SamplingGrid, SignalTransform};
pub use quadrature::QuadratureRule;
pub use region::{MeshBox, Region};
pub use slepian::{SlepianBasis, SlepianMesh, SlepianSphere};
pub use wavelet::{create_kappas, WaveletBank, WaveletCoefficients, WaveletDomain};
