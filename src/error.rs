//! Error types shared by every stage of the Slepian pipeline.

use std::ops::Range;
use std::path::PathBuf;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SlepianError>;

/// Error type for all fallible operations in the crate.
///
/// None of these are retried: numerical integration is deterministic for a
/// given input, so every variant bubbles to the top-level call.
#[derive(Debug, thiserror::Error)]
pub enum SlepianError {
    /// Invalid region angles, mismatched mask shape, out-of-range rank/order.
    #[error("invalid configuration for `{parameter}`: {reason}")]
    Configuration {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Human readable explanation.
        reason: String,
    },

    /// Cached or supplied data does not match the requested problem size.
    #[error("dimension mismatch for {what}: expected {expected}, got {actual}")]
    Dimension {
        /// Which quantity disagreed.
        what: &'static str,
        /// Size required by the request.
        expected: usize,
        /// Size actually available.
        actual: usize,
    },

    /// A worker of the parallel matrix fill failed; the buffer was discarded.
    #[error("worker for rows {}..{} failed: {source}", .rows.start, .rows.end)]
    Concurrency {
        /// Row range owned by the failing worker.
        rows: Range<usize>,
        /// Error raised inside the worker.
        #[source]
        source: Box<SlepianError>,
    },

    /// The thread pool for the parallel fill could not be created.
    #[error("could not start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Not a failure: only a sub-range of rows was requested, the partial
    /// matrix was persisted and the caller must re-invoke for the rest.
    #[error("large job split: rows {}..{} of {total} computed and saved as `{label}`", .rows.start, .rows.end)]
    LargeJobSplit {
        /// Rows filled by this invocation.
        rows: Range<usize>,
        /// Total number of rows of the full problem.
        total: usize,
        /// Cache label under which the partial matrix was stored.
        label: String,
    },

    /// The requested operation is not provided by this backend.
    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// Mask or cache asset could not be found.
    #[error("asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    /// Underlying filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failure reading a `.npy` file.
    #[error("npy read failed: {0}")]
    NpyRead(#[from] ndarray_npy::ReadNpyError),

    /// Failure writing a `.npy` file.
    #[error("npy write failed: {0}")]
    NpyWrite(#[from] ndarray_npy::WriteNpyError),

    /// Array could not be reshaped into the expected layout.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// Configuration file could not be parsed.
    #[error("config parse failed: {0}")]
    Toml(#[from] toml::de::Error),
}

impl SlepianError {
    pub(crate) fn config(parameter: &'static str, reason: impl Into<String>) -> Self {
        SlepianError::Configuration {
            parameter,
            reason: reason.into(),
        }
    }

    /// True for the `LargeJobSplit` control signal.
    pub fn is_large_job_split(&self) -> bool {
        matches!(self, SlepianError::LargeJobSplit { .. })
    }
}
