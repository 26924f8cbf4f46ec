//! Session events and channel-based delivery
//!
//! The radio reports everything that happens to an active session as a
//! [`SessionEvent`] delivered over a channel. For one session the transport
//! delivers events totally ordered; there is no overlap between discovery,
//! connection, and invalidation notifications.

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use thiserror::Error;

/// Events delivered by the radio for one polling session
#[derive(Debug)]
pub enum SessionEvent<T> {
    /// The radio began polling for tags
    Active,
    /// One or more tags entered the field
    Discovered(Vec<T>),
    /// The session was torn down; no further events follow
    Invalidated(InvalidateReason),
}

/// Why a session was invalidated by the transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidateReason {
    /// The user dismissed the session surface
    #[error("Session was cancelled by the user")]
    UserCancelled,

    /// The platform enforced its per-session time limit
    #[error("Session timed out")]
    Timeout,

    /// The radio is unavailable or claimed by the system
    #[error("The radio is busy")]
    SystemBusy,

    /// Any other transport-reported reason
    #[error("Session terminated: {0}")]
    Other(String),
}

/// Sender for session events
pub type SessionEventSender<T> = Sender<SessionEvent<T>>;
/// Receiver for session events
pub type SessionEventReceiver<T> = Receiver<SessionEvent<T>>;

/// Create an unbounded channel for session events
pub fn session_event_channel<T>() -> (SessionEventSender<T>, SessionEventReceiver<T>) {
    unbounded()
}

/// Create a bounded channel with the specified capacity for session events
pub fn bounded_session_event_channel<T>(
    capacity: usize,
) -> (SessionEventSender<T>, SessionEventReceiver<T>) {
    bounded(capacity)
}
