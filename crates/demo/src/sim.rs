//! Scripted radio simulator
//!
//! There is no platform radio in this repository, so the demo binary and the
//! flow tests run against a simulator: a [`TagReader`] that replays a
//! configurable script of session events with realistic delays, plus a
//! canned command-set collaborator standing in for the external card-command
//! library.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;
use tagsession_core::{
    Disposition, InvalidateReason, PollingSession, SessionEvent, SessionEventSender, TagHandle,
    TagProtocol, TagReader, TransportError,
};
use tracing::{debug, info};

use crate::commands::{CommandError, CommandSet};
use crate::credentials::Credentials;
use crate::info::{Capabilities, Capability, CardInfo, Version};

/// A simulated tag
#[derive(Debug, Clone)]
pub struct SimTag {
    protocol: TagProtocol,
    present: Arc<AtomicBool>,
    connected: Arc<AtomicBool>,
}

impl SimTag {
    fn new(protocol: TagProtocol) -> Self {
        Self {
            protocol,
            present: Arc::new(AtomicBool::new(true)),
            connected: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Pull the tag out of the field
    pub fn leave_field(&self) {
        self.present.store(false, Ordering::SeqCst);
    }
}

impl TagHandle for SimTag {
    fn do_transmit(&mut self, _command: &[u8]) -> Result<Bytes, TransportError> {
        if !self.present.load(Ordering::SeqCst) {
            return Err(TransportError::TagLost);
        }
        if !self.connected.load(Ordering::SeqCst) {
            return Err(TransportError::Connection);
        }
        // The simulated card answers every exchange with a bare OK.
        Ok(Bytes::from_static(&[0x90, 0x00]))
    }

    fn is_available(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    fn protocol(&self) -> TagProtocol {
        self.protocol
    }
}

/// One step of a simulated session script
#[derive(Debug, Clone)]
pub enum SimStep {
    /// Wait before the next step
    Delay(Duration),
    /// Tags with the given protocols enter the field
    Discover(Vec<TagProtocol>),
    /// The platform tears the session down
    Invalidate(InvalidateReason),
}

/// Scripted stand-in for a platform NFC radio
#[derive(Debug, Clone)]
pub struct SimReader {
    available: bool,
    script: Vec<SimStep>,
    dispositions: Arc<Mutex<Vec<Disposition>>>,
}

impl SimReader {
    /// A radio where one ISO 7816 card appears shortly after the scan starts
    pub fn with_card() -> Self {
        Self::with_card_after(Duration::from_millis(600))
    }

    /// A radio where one ISO 7816 card appears after the given delay
    pub fn with_card_after(delay: Duration) -> Self {
        Self::scripted(vec![
            SimStep::Delay(delay),
            SimStep::Discover(vec![TagProtocol::Iso7816]),
        ])
    }

    /// A radio replaying the given script for every session
    pub fn scripted(script: Vec<SimStep>) -> Self {
        Self {
            available: true,
            script,
            dispositions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A radio on a platform without scanning support
    pub fn unsupported() -> Self {
        Self {
            available: false,
            script: Vec::new(),
            dispositions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Terminal dispositions recorded across all sessions
    pub fn dispositions(&self) -> Vec<Disposition> {
        self.dispositions.lock().clone()
    }
}

impl TagReader for SimReader {
    type Tag = SimTag;
    type Session = SimSession;

    fn is_available(&self) -> bool {
        self.available
    }

    fn begin(
        &self,
        prompt: &str,
        events: SessionEventSender<SimTag>,
    ) -> Result<SimSession, TransportError> {
        info!(prompt, "scan started");

        let invalidated = Arc::new(AtomicBool::new(false));
        let session = SimSession {
            invalidated: Arc::clone(&invalidated),
            events: events.clone(),
            dispositions: Arc::clone(&self.dispositions),
        };

        let script = self.script.clone();
        thread::spawn(move || {
            let _ = events.send(SessionEvent::Active);
            for step in script {
                if invalidated.load(Ordering::SeqCst) {
                    return;
                }
                match step {
                    SimStep::Delay(delay) => thread::sleep(delay),
                    SimStep::Discover(protocols) => {
                        let tags = protocols.into_iter().map(SimTag::new).collect();
                        if events.send(SessionEvent::Discovered(tags)).is_err() {
                            return;
                        }
                    }
                    SimStep::Invalidate(reason) => {
                        let _ = events.send(SessionEvent::Invalidated(reason));
                        return;
                    }
                }
            }
        });

        Ok(session)
    }
}

/// Session surface handed out by [`SimReader::begin`]
#[derive(Debug)]
pub struct SimSession {
    invalidated: Arc<AtomicBool>,
    events: SessionEventSender<SimTag>,
    dispositions: Arc<Mutex<Vec<Disposition>>>,
}

impl PollingSession for SimSession {
    type Tag = SimTag;

    fn set_prompt(&self, message: &str) {
        info!(message, "prompt updated");
    }

    fn connect(&self, tag: &SimTag) -> Result<(), TransportError> {
        if self.invalidated.load(Ordering::SeqCst) {
            return Err(TransportError::Cancelled);
        }
        if !tag.is_available() {
            return Err(TransportError::TagLost);
        }
        tag.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn restart_polling(&self) {
        debug!("polling restarted");
    }

    fn invalidate(&self, disposition: Disposition) {
        if self.invalidated.swap(true, Ordering::SeqCst) {
            return;
        }
        match &disposition {
            Disposition::Success(message) => info!(%message, "session dismissed"),
            Disposition::Failure(message) => info!(%message, "session dismissed with error"),
        }
        self.dispositions.lock().push(disposition);
        let _ = self
            .events
            .send(SessionEvent::Invalidated(InvalidateReason::UserCancelled));
    }
}

// SELECT with an empty AID; works against the simulated card like it does
// against most real ones.
const SELECT_HEADER: [u8; 5] = [0x00, 0xA4, 0x04, 0x00, 0x00];
const INIT_HEADER: [u8; 5] = [0x80, 0xFE, 0x00, 0x00, 0x00];

/// Canned command-set collaborator for the simulated card
#[derive(Debug, Clone)]
pub struct SimCommandSet {
    info: CardInfo,
}

impl SimCommandSet {
    /// A command set talking to a fresh, uninitialized simulated card
    pub fn new() -> Self {
        Self {
            info: CardInfo {
                initialized: false,
                instance_uid: [
                    0x5F, 0x2A, 0x90, 0x11, 0x3C, 0x07, 0xD4, 0x48, 0xA1, 0x66, 0x0B, 0xE9, 0x21,
                    0x8D, 0x73, 0xFE,
                ],
                version: Version { major: 3, minor: 1 },
                free_pairing_slots: 5,
                capabilities: Capabilities::new(&[
                    Capability::SecureChannel,
                    Capability::KeyManagement,
                    Capability::CredentialsManagement,
                    Capability::Ndef,
                ]),
                public_key: Some(sim_public_key()),
            },
        }
    }
}

impl Default for SimCommandSet {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TagHandle> CommandSet<T> for SimCommandSet {
    fn select(&mut self, tag: &mut T) -> Result<CardInfo, CommandError> {
        let response = tag.transmit(&SELECT_HEADER)?;
        expect_ok(&response)?;
        Ok(self.info.clone())
    }

    fn init(&mut self, tag: &mut T, credentials: &Credentials) -> Result<(), CommandError> {
        debug!(
            pairing_slots = self.info.free_pairing_slots,
            pin_digits = credentials.pin().len(),
            "initializing simulated card"
        );
        let response = tag.transmit(&INIT_HEADER)?;
        expect_ok(&response)?;
        self.info.initialized = true;
        Ok(())
    }
}

/// An uncompressed SEC1 point with a recognizable byte pattern
fn sim_public_key() -> Vec<u8> {
    let mut key = Vec::with_capacity(65);
    key.push(0x04);
    key.extend((0u8..64).map(|i| i.wrapping_mul(3)));
    key
}

fn expect_ok(response: &[u8]) -> Result<(), CommandError> {
    if response.len() < 2 {
        return Err(CommandError::Malformed("response shorter than a status word"));
    }
    let sw = (u16::from(response[response.len() - 2]) << 8)
        | u16::from(response[response.len() - 1]);
    if sw != 0x9000 {
        return Err(CommandError::Status(sw));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sim_tag_requires_connection() {
        let mut tag = SimTag::new(TagProtocol::Iso7816);
        assert!(matches!(
            tag.transmit(&SELECT_HEADER),
            Err(TransportError::Connection)
        ));

        tag.connected.store(true, Ordering::SeqCst);
        assert_eq!(tag.transmit(&SELECT_HEADER).unwrap().as_ref(), &[0x90, 0x00]);

        tag.leave_field();
        assert!(matches!(
            tag.transmit(&SELECT_HEADER),
            Err(TransportError::TagLost)
        ));
    }

    #[test]
    fn command_set_select_then_init() {
        let mut tag = SimTag::new(TagProtocol::Iso7816);
        tag.connected.store(true, Ordering::SeqCst);
        let mut commands = SimCommandSet::new();

        let info = commands.select(&mut tag).unwrap();
        assert!(!info.initialized);

        let credentials = Credentials::new("123456", "123456789012", "pass").unwrap();
        commands.init(&mut tag, &credentials).unwrap();

        let info = commands.select(&mut tag).unwrap();
        assert!(info.initialized);
    }

    #[test]
    fn expect_ok_rejects_bad_status() {
        assert!(expect_ok(&[0x90, 0x00]).is_ok());
        assert!(matches!(
            expect_ok(&[0x6A, 0x82]),
            Err(CommandError::Status(0x6A82))
        ));
        assert!(matches!(
            expect_ok(&[0x90]),
            Err(CommandError::Malformed(_))
        ));
    }
}
