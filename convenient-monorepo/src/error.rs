//! Error types for discovery, change detection and persistence

use std::path::PathBuf;

/// Result type used across the crate.
pub type Result<T> = std::result::Result<T, MonorepoError>;

/// Errors that abort a run.
///
/// A build script exiting non-zero is not an error: it is recorded on the
/// build request and folded into the aggregate verdict.
#[derive(Debug, thiserror::Error)]
pub enum MonorepoError {
    /// A standard project has neither `requirements.txt` nor `package.json`
    #[error("No requirements file found in {0}")]
    RequirementsFileNotFound(PathBuf),

    /// The configuration document has no `config` section
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The configuration document names a setting that does not exist
    #[error("Invalid configuration setting: {0}")]
    InvalidConfigurationSetting(String),

    /// I/O failure on a specific path
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failure
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Snapshot or configuration (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Snapshot written by an incompatible version of the tool
    #[error("Unsupported snapshot schema {found} in {path} (expected {expected})")]
    UnsupportedSnapshotSchema {
        /// Snapshot file
        path: PathBuf,
        /// Schema found in the file
        found: u32,
        /// Schema this build understands
        expected: u32,
    },

    /// The worker pool for parallel builds could not be created
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Copying artifacts to or from the shared location failed
    #[error("Artifact distribution failed for {project}: {message}")]
    Distribution {
        /// Project whose artifacts were being moved
        project: String,
        /// What went wrong
        message: String,
    },
}

impl MonorepoError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
