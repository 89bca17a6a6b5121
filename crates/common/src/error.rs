//! Error types shared across Stridelab crates.

use std::path::PathBuf;

/// Top-level error type for Stridelab operations.
#[derive(Debug, thiserror::Error)]
pub enum StrideError {
    /// The caller broke a documented precondition (length mismatch,
    /// unknown method tag, out-of-range parameter).
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using StrideError.
pub type StrideResult<T> = Result<T, StrideError>;

impl StrideError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Length mismatch between a series and a vector that must be aligned to it.
    pub fn length_mismatch(what: &str, expected: usize, found: usize) -> Self {
        Self::invalid_argument(format!(
            "{what} has length {found}, expected {expected} to match the series"
        ))
    }
}

/// Fail with [`StrideError::InvalidArgument`] unless `found == expected`.
pub fn ensure_same_len(what: &str, expected: usize, found: usize) -> StrideResult<()> {
    if expected == found {
        Ok(())
    } else {
        Err(StrideError::length_mismatch(what, expected, found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_same_len() {
        assert!(ensure_same_len("validity", 3, 3).is_ok());
        let err = ensure_same_len("validity", 3, 2).unwrap_err();
        assert!(matches!(err, StrideError::InvalidArgument { .. }));
        assert!(err.to_string().contains("validity has length 2"));
    }
}
