//! Error types for the conversation crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `StoreError`: Errors from history/context storage backends

use std::fmt;

/// Errors from conversation storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be read.
    ReadFailed { reason: String },
    /// The backing store could not be written.
    WriteFailed { reason: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed { reason } => write!(f, "conversation store read failed: {reason}"),
            Self::WriteFailed { reason } => {
                write!(f, "conversation store write failed: {reason}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_display() {
        let err = StoreError::WriteFailed {
            reason: "lock poisoned".to_string(),
        };
        assert!(err.to_string().contains("write failed"));
        assert!(err.to_string().contains("lock poisoned"));
    }
}
