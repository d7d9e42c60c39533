//! Error types.

/// Errors surfaced before or during a relaxation run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A run parameter failed validation.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    /// The worker count cannot partition the grid.
    #[error("invalid partition ({workers} workers over {rows} rows): {msg}")]
    InvalidPartition {
        /// Number of grid rows being partitioned.
        rows: usize,
        /// Number of workers in the group.
        workers: usize,
        /// What went wrong.
        msg: String,
    },
    /// A message was lost, mismatched, or had the wrong size.
    #[error("communication failure: {0}")]
    Comm(String),
    /// Writing the assembled grid failed.
    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid_parameters(msg: impl Into<String>) -> Self {
        Error::InvalidParameters(msg.into())
    }

    pub(crate) fn comm(msg: impl Into<String>) -> Self {
        Error::Comm(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
