//! Shared error type across tally crates.

use thiserror::Error;

/// Stable error classes, independent of the message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Declared label keys contain duplicates.
    InvalidArity,
    /// Label values do not match the declared key count.
    ArityMismatch,
    /// Negative delta applied to a counter.
    NegativeDelta,
    /// No mutation ever created the requested series.
    SeriesNotFound,
    /// Identity reused with a conflicting signature.
    DuplicateIdentity,
    /// Registry was torn down.
    RegistryDestroyed,
    /// Snapshot could not be rendered.
    Encode,
    /// Compact binary payload is malformed.
    Decode,
    /// Metric or label name is not a valid identifier.
    InvalidName,
    /// Configuration could not be parsed or validated.
    InvalidConfig,
    /// Resource exhaustion.
    Allocation,
}

impl ErrorKind {
    /// String representation used in logs and test vectors.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidArity => "INVALID_ARITY",
            ErrorKind::ArityMismatch => "ARITY_MISMATCH",
            ErrorKind::NegativeDelta => "NEGATIVE_DELTA",
            ErrorKind::SeriesNotFound => "SERIES_NOT_FOUND",
            ErrorKind::DuplicateIdentity => "DUPLICATE_IDENTITY",
            ErrorKind::RegistryDestroyed => "REGISTRY_DESTROYED",
            ErrorKind::Encode => "ENCODE_ERROR",
            ErrorKind::Decode => "DECODE_ERROR",
            ErrorKind::InvalidName => "INVALID_NAME",
            ErrorKind::InvalidConfig => "INVALID_CONFIG",
            ErrorKind::Allocation => "ALLOCATION_ERROR",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and registry.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("invalid label keys: {0}")]
    InvalidArity(String),
    #[error("label arity mismatch: expected {expected}, got {got}")]
    ArityMismatch { expected: usize, got: usize },
    #[error("counter delta must be non-negative, got {0}")]
    NegativeDelta(f64),
    #[error("series not found")]
    SeriesNotFound,
    #[error("duplicate identity: {0}")]
    DuplicateIdentity(String),
    #[error("registry destroyed")]
    RegistryDestroyed,
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("allocation failed: {0}")]
    AllocationError(String),
}

impl MetricsError {
    /// Map the error to its stable class.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetricsError::InvalidArity(_) => ErrorKind::InvalidArity,
            MetricsError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            MetricsError::NegativeDelta(_) => ErrorKind::NegativeDelta,
            MetricsError::SeriesNotFound => ErrorKind::SeriesNotFound,
            MetricsError::DuplicateIdentity(_) => ErrorKind::DuplicateIdentity,
            MetricsError::RegistryDestroyed => ErrorKind::RegistryDestroyed,
            MetricsError::Encode(_) => ErrorKind::Encode,
            MetricsError::Decode(_) => ErrorKind::Decode,
            MetricsError::InvalidName(_) => ErrorKind::InvalidName,
            MetricsError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            MetricsError::AllocationError(_) => ErrorKind::Allocation,
        }
    }
}

impl From<std::fmt::Error> for MetricsError {
    fn from(e: std::fmt::Error) -> Self {
        MetricsError::Encode(format!("formatter error: {e}"))
    }
}

impl From<std::collections::TryReserveError> for MetricsError {
    fn from(e: std::collections::TryReserveError) -> Self {
        MetricsError::AllocationError(e.to_string())
    }
}
