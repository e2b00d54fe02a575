//! Error types for the collection engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in collection engine operations.
///
/// Each variant carries a short internal code (`SH-0NN`) for log
/// correlation, returned by [`Error::code`].
#[derive(Error, Debug)]
pub enum Error {
    /// A collection with this name already exists (SH-001).
    #[error("[SH-001] collection '{0}' already exists")]
    CollectionExists(String),

    /// No collection with this name exists (SH-002).
    #[error("[SH-002] collection '{0}' not found")]
    CollectionNotFound(String),

    /// No record with this value (or matching vector) exists (SH-003).
    #[error("[SH-003] value '{0}' not found")]
    NotFound(String),

    /// Vector length does not match the collection's dimension (SH-004).
    #[error("[SH-004] dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension the collection was created with.
        expected: usize,
        /// Dimension of the vector the caller supplied.
        actual: usize,
    },

    /// Insert rejected: `value` already names a live row (SH-005).
    #[error("[SH-005] duplicate value '{0}'")]
    DuplicateValue(String),

    /// Insert rejected: the vector's sign signature collides with a live row (SH-006).
    #[error("[SH-006] duplicate vector")]
    DuplicateVector,

    /// Unrecognized distance metric identifier (SH-007).
    #[error("[SH-007] invalid metric: {0}")]
    InvalidMetric(String),

    /// Malformed or out-of-range argument (SH-008).
    #[error("[SH-008] invalid argument: {0}")]
    InvalidArgument(String),

    /// Two inputs to a standalone distance helper had different lengths (SH-009).
    #[error("[SH-009] length mismatch: {a} vs {b}")]
    LengthMismatch {
        /// Length of the first input.
        a: usize,
        /// Length of the second input.
        b: usize,
    },
}

impl Error {
    /// Returns the short internal error code (e.g. `"SH-004"`).
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::CollectionExists(_) => "SH-001",
            Self::CollectionNotFound(_) => "SH-002",
            Self::NotFound(_) => "SH-003",
            Self::DimensionMismatch { .. } => "SH-004",
            Self::DuplicateValue(_) => "SH-005",
            Self::DuplicateVector => "SH-006",
            Self::InvalidMetric(_) => "SH-007",
            Self::InvalidArgument(_) => "SH-008",
            Self::LengthMismatch { .. } => "SH-009",
        }
    }
}
