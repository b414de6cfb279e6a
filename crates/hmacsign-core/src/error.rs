//! Error types for the hmacsign core.

/// Core error type for hmacsign infrastructure.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Unknown signing mode name.
    #[error("invalid HMAC signing mode: {0} (expected `header` or `uri`)")]
    InvalidSigningMode(String),
}

/// Convenience result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
