//! Tag handle abstraction
//!
//! A [`TagHandle`] is the controller's view of one physical tag discovered by
//! the radio. It can exchange raw APDU bytes and report whether the tag is
//! still in the field. A handle is only valid for the duration of the session
//! that discovered it, and only usable for exchange once the session has
//! connected to it.

use std::fmt;

use bytes::Bytes;
use tracing::{debug, trace};

use crate::error::TransportError;

/// Radio-level protocol exposed by a discovered tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagProtocol {
    /// ISO/IEC 7816-4 smart card over ISO/IEC 14443-4
    Iso7816,
    /// MIFARE family tag
    Mifare,
    /// FeliCa tag
    Felica,
    /// ISO/IEC 15693 vicinity tag
    Iso15693,
}

impl TagProtocol {
    /// Whether the tag speaks ISO 7816 APDUs. Only such tags can carry a
    /// smart-card conversation.
    pub const fn is_iso7816(&self) -> bool {
        matches!(self, Self::Iso7816)
    }
}

/// Handle to a discovered contactless tag
///
/// The handle's validity is scoped to its session: callers must not retain it
/// after the session terminates.
pub trait TagHandle: Send + fmt::Debug + 'static {
    /// Send raw APDU bytes to the tag and return the response bytes
    ///
    /// Only valid once the owning session has connected to this tag.
    fn transmit(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        trace!(command = ?hex::encode(command), "Transmitting raw command");
        let result = self.do_transmit(command);
        match &result {
            Ok(response) => {
                trace!(response = ?hex::encode(response), "Received raw response");
            }
            Err(e) => {
                debug!(error = ?e, "Transport error during transmission");
            }
        }
        result
    }

    /// Internal implementation of transmit
    /// This is the method that concrete implementations should override
    fn do_transmit(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Whether the tag is still in range of the radio
    fn is_available(&self) -> bool;

    /// The radio-level protocol this tag exposes
    fn protocol(&self) -> TagProtocol;
}
