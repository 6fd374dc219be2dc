//! Error types for interpolation

use thiserror::Error;
use tinterp_proof::ProofError;

/// Interpolation errors
#[derive(Debug, Error)]
pub enum InterpolationError {
    /// A leaf kind the engine has no interpolation rule for
    #[error("unsupported leaf kind `{0}`")]
    UnsupportedLeaf(String),

    /// A mixed literal whose shape cannot be split between partitions,
    /// rendered in SMT-LIB syntax
    #[error("unsupported mixed literal {0}")]
    UnsupportedMixedLiteral(String),

    /// The cancellation callback asked the walk to stop
    #[error("interpolation cancelled")]
    Cancelled,

    /// A computed interpolant violates the tree-interpolant contract
    #[error("self-check failed for partition {partition}: {reason}")]
    SelfCheckFailed {
        /// Post-order index of the offending partition
        partition: usize,
        /// What the check found
        reason: String,
    },

    /// An asserted leaf names a source no partition claims
    #[error("unknown source partition `{0}`")]
    UnknownSource(String),

    /// The partition tree is not a valid post-order layout
    #[error("invalid partition tree: {0}")]
    InvalidPartitionTree(String),

    /// The proof does not have the structure the engine relies on
    #[error("malformed proof: {0}")]
    MalformedProof(String),

    /// Error from the proof crate
    #[error(transparent)]
    Proof(#[from] ProofError),

    /// Broken engine invariant or misuse of a session
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for interpolation operations
pub type InterpolationResult<T> = Result<T, InterpolationError>;
