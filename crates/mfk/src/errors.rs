use thiserror::Error;

/// A result type for multi-fidelity surrogates
pub type Result<T> = std::result::Result<T, MfkError>;

/// An error when training or using a multi-fidelity surrogate
#[derive(Error, Debug)]
pub enum MfkError {
    /// When the underlying GP regression fails
    #[error(transparent)]
    GpError(#[from] mfbox_gp::GpError),
    /// When an error is due to a bad value
    #[error("InvalidValue error: {0}")]
    InvalidValueError(String),
}
