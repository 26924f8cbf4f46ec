//! Card-command collaborator seam
//!
//! Command encoding, secure-channel cryptography and the card command set
//! live outside this application. The flows only require something that can
//! select the applet and initialize the card over a connected tag handle.

use tagsession_core::{TagHandle, TransportError};
use thiserror::Error;

use crate::credentials::Credentials;
use crate::info::CardInfo;

/// Errors reported by the card-command collaborator
#[derive(Debug, Error)]
pub enum CommandError {
    /// Transport-level failure during an exchange
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The card answered with an unexpected status word
    #[error("Unexpected status word: {0:#06X}")]
    Status(u16),

    /// The card's response could not be parsed
    #[error("Malformed response: {0}")]
    Malformed(&'static str),
}

/// External collaborator supplying the card command set
///
/// Implementations exchange whatever protocol data units they need through
/// the tag handle they are given; this application never encodes commands
/// itself.
pub trait CommandSet<T: TagHandle>: Send + 'static {
    /// Select the card applet and report its status
    fn select(&mut self, tag: &mut T) -> Result<CardInfo, CommandError>;

    /// Initialize the card with the given credentials
    fn init(&mut self, tag: &mut T, credentials: &Credentials) -> Result<(), CommandError>;
}
