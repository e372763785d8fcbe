//! Property subsystem error taxonomy.

use thiserror::Error;

/// Error type for property operations.
///
/// `Unsupported` is reserved for capabilities that are genuinely absent:
/// either the definition does not declare them, or the device reports the
/// named capability missing. Ambiguous failures (connectivity, device-side
/// errors, unrecognized transport codes) are `Transport`, never guessed as
/// `Unsupported`.
#[derive(Debug, Clone, Error)]
pub enum PropertyError {
    #[error("property {property} is not supported")]
    Unsupported { property: String },

    #[error("transport failure: {message}")]
    Transport { message: String },

    #[error("commit rejected: {message}")]
    Rejected { message: String },

    #[error("invalid property definition: {message}")]
    Definition { message: String },

    #[error("value handler failed: {message}")]
    Handler { message: String },
}

impl PropertyError {
    /// Whether this error means the capability is absent rather than broken.
    #[must_use]
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result type for property operations.
pub type PropertyResult<T> = Result<T, PropertyError>;
