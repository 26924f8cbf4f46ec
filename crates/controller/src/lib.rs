//! Lifecycle controller for contactless tag sessions
//!
//! This crate owns the one piece of real machinery in a tag-reading
//! application: acquiring, validating, using, and releasing a contactless
//! card connection. A [`SessionController`] drives at most one session at a
//! time through the following states:
//!
//! ```text
//! Idle -> Polling -> (Connecting -> Ready -> Done)
//!                  | (MultiTagDetected -> RemovalWait -> Polling)
//!                  | Failed
//! ```
//!
//! The caller supplies two continuations when starting a scan: `on_ready`,
//! invoked with the connected tag on a dedicated worker thread so protocol
//! exchanges never block session bookkeeping, and `on_failure`, invoked when
//! the session dies before a tag was handed over. Exactly one terminal
//! notification is delivered per session.
//!
//! The controller knows nothing about card protocols. The continuation that
//! receives the tag performs whatever exchange it wants and then ends the
//! session through [`SessionController::end_session`] with a success or
//! failure message.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![forbid(unsafe_code)]
#![warn(missing_docs, rustdoc::missing_crate_level_docs)]

// Core modules
mod config;
mod controller;
mod error;

// Public exports
pub use config::ControllerConfig;
pub use controller::{
    CONNECTION_ERROR_MESSAGE, FailureFn, MULTIPLE_TAGS_PROMPT, ReadyFn, SessionController,
    UNSUPPORTED_TAG_MESSAGE,
};
pub use error::SessionError;

// Re-export the transport-facing abstractions for convenience
pub use tagsession_core::{
    Disposition, InvalidateReason, PollingSession, SessionEvent, TagHandle, TagProtocol,
    TagReader, TransportError,
};
