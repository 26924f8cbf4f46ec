//! Error types specific to tag transports

use thiserror::Error;

/// Transport error type
///
/// Covers everything that can go wrong between the radio and a tag,
/// independent of any card protocol semantics.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection error
    #[error("Failed to connect to tag")]
    Connection,

    /// Transmission error
    #[error("Failed to transmit data")]
    Transmission,

    /// The tag left the field
    #[error("Tag is no longer available")]
    TagLost,

    /// Session was torn down while an operation was in flight
    #[error("Operation cancelled")]
    Cancelled,

    /// Other error with message
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Create a general other error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Self::Other(message.into())
    }

    /// Whether the error indicates the tag went out of range
    pub const fn is_tag_lost(&self) -> bool {
        matches!(self, Self::TagLost)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn other_carries_message() {
        let err = TransportError::other("radio busy");
        assert_eq!(err.to_string(), "radio busy");
    }

    #[test]
    fn tag_lost_predicate() {
        assert!(TransportError::TagLost.is_tag_lost());
        assert!(!TransportError::Connection.is_tag_lost());
    }
}
