//! Core traits and types for contactless tag sessions
//!
//! This crate provides the foundational abstractions for driving a single
//! contactless smart-card conversation over an NFC-style radio:
//!
//! - [`TagHandle`]: an opaque handle to a discovered tag, able to exchange
//!   APDUs and to report whether it is still in range
//! - [`TagReader`]: the platform radio capability that begins a polling
//!   session and delivers [`SessionEvent`]s over a channel
//! - [`PollingSession`]: the per-session surface used to steer an active
//!   scan (prompt updates, connecting, restarting, invalidation)
//!
//! The crate deliberately knows nothing about command encodings or any
//! particular card application; those concerns live behind the [`TagHandle`]
//! exchange seam.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Re-export bytes for convenience
pub use bytes::Bytes;

// Main modules
pub mod error;
pub mod event;
pub mod reader;
pub mod session;
pub mod tag;

pub use error::TransportError;
pub use event::{
    InvalidateReason, SessionEvent, SessionEventReceiver, SessionEventSender,
    bounded_session_event_channel, session_event_channel,
};
pub use reader::TagReader;
pub use session::{Disposition, PollingSession};
pub use tag::{TagHandle, TagProtocol};
