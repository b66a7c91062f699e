use thiserror::Error;

/// Error taxonomy shared by the store, resolver, and coordinators.
///
/// Variants carry owned strings so the whole error is `Clone`; the
/// session resolver fans a single failure out to every waiter of an
/// in-flight creation.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    /// Room (or one of its fields) has no resolvable state.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller's role does not carry the required capability.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Malformed input, rejected before any state mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Storage or platform I/O failure; safe to retry.
    #[error("transient failure: {0}")]
    Transient(String),
}

impl CoreError {
    /// Whether a caller may retry the operation as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Transient(_))
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
