//! Error types for orimap.

use thiserror::Error;

/// Result alias for orimap operations.
pub type OriMapResult<T> = std::result::Result<T, OriMapError>;

/// Errors that can occur while reducing indexation results.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum OriMapError {
    /// The input data or parameters are invalid.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: &'static str },
    /// Scan dimensions must be non-zero.
    #[error("invalid scan dimensions: width={width}, height={height}")]
    InvalidDimensions { width: usize, height: usize },
    /// A buffer does not hold the number of elements its shape implies.
    #[error("length mismatch for {context}: expected {expected}, got {got}")]
    LengthMismatch {
        expected: usize,
        got: usize,
        context: &'static str,
    },
    /// An index is outside the valid range.
    #[error("index {index} out of bounds for {context} (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
    /// A match set must hold at least one candidate.
    #[error("match set has no candidates")]
    EmptyMatchSet,
    /// A candidate has a lower total error than its predecessor in the same phase.
    #[error("candidate {index} breaks ascending total_error order within phase {phase_index}")]
    UnsortedCandidates { index: usize, phase_index: usize },
    /// The candidates of a phase are split into more than one run.
    #[error("candidates of phase {phase_index} are not contiguous (phase resumes at {index})")]
    UngroupedPhase { index: usize, phase_index: usize },
    /// A rotation matrix is not a proper orthonormal matrix.
    #[error("invalid rotation matrix: {reason}")]
    InvalidRotation { reason: &'static str },
    /// Pixels disagree on which properties they carry.
    #[error("pixel {index} carries properties {found:?}, expected {expected:?}")]
    PropertyKeysMismatch {
        index: usize,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A phase index has no counterpart in the diffraction library.
    #[error("phase index {phase_index} not in library ({len} phases)")]
    UnknownPhase { phase_index: usize, len: usize },
    /// The diffraction library has no simulation for a phase/orientation pair.
    #[error("no library entry for phase '{phase}' at euler {euler_deg:?}")]
    MissingLibraryEntry { phase: String, euler_deg: [f64; 3] },
    /// The operation exists in the interface but is not available yet.
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: &'static str },
}
