//! Button subsystem error types.

use thiserror::Error;

/// Button error type.
#[derive(Debug, Clone, Error)]
pub enum ButtonError {
    #[error("device does not support button customization")]
    NotSupported,

    #[error("button not present on this device")]
    NoSuchButton,

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Result type for button operations.
pub type ButtonResult<T> = Result<T, ButtonError>;
