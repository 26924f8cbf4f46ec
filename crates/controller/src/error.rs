//! Error types for session control

use tagsession_core::{InvalidateReason, TransportError};
use thiserror::Error;

/// Terminal session failures reported through the `on_failure` continuation
#[derive(Debug, Error)]
pub enum SessionError {
    /// Contactless scanning is not supported on this platform
    ///
    /// Surfaced once at startup by callers that query availability before
    /// offering any action; `start` itself drops requests silently when the
    /// radio is unavailable.
    #[error("This device doesn't support tag scanning")]
    Unavailable,

    /// The lone detected tag does not expose the ISO 7816 capability
    #[error("Unsupported Smart Card")]
    UnsupportedTag,

    /// Establishing the logical connection to the tag failed
    #[error("Connection error, please try again")]
    Connection(#[source] TransportError),

    /// Arming the scan failed before any tag was seen
    #[error("Failed to begin scanning")]
    Begin(#[source] TransportError),

    /// The transport tore the session down
    #[error(transparent)]
    Invalidated(#[from] InvalidateReason),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_visible_messages() {
        assert_eq!(
            SessionError::UnsupportedTag.to_string(),
            "Unsupported Smart Card"
        );
        assert_eq!(
            SessionError::Connection(TransportError::Connection).to_string(),
            "Connection error, please try again"
        );
        assert_eq!(
            SessionError::Invalidated(InvalidateReason::Timeout).to_string(),
            "Session timed out"
        );
    }
}
